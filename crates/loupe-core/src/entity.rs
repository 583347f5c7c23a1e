//! Catalog entities, as referenced by activities and shown in the
//! description pane.

use serde::{Deserialize, Serialize};

/// A classification badge attached to an entity (table, dashboard, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityClass {
  pub id:   i64,
  pub name: String,
}

/// The entity an activity concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntityRef {
  pub id:             i64,
  #[serde(default)]
  pub external_name:  Option<String>,
  #[serde(default)]
  pub internal_name:  Option<String>,
  #[serde(default)]
  pub entity_classes: Vec<EntityClass>,
}

impl DataEntityRef {
  /// External name, else internal name, else the empty string.
  pub fn display_name(&self) -> &str {
    pick_name(self.external_name.as_deref(), self.internal_name.as_deref())
  }
}

/// The subset of an entity's details the description pane needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntityDetails {
  pub id:                   i64,
  #[serde(default)]
  pub external_name:        Option<String>,
  #[serde(default)]
  pub internal_name:        Option<String>,
  #[serde(default)]
  pub entity_classes:       Vec<EntityClass>,
  /// Written by users in the catalog; editable.
  #[serde(default)]
  pub internal_description: Option<String>,
  /// Ingested from the source system; read-only.
  #[serde(default)]
  pub external_description: Option<String>,
}

impl DataEntityDetails {
  pub fn display_name(&self) -> &str {
    pick_name(self.external_name.as_deref(), self.internal_name.as_deref())
  }
}

fn pick_name<'a>(external: Option<&'a str>, internal: Option<&'a str>) -> &'a str {
  external
    .filter(|n| !n.is_empty())
    .or(internal)
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entity(external: Option<&str>, internal: Option<&str>) -> DataEntityRef {
    DataEntityRef {
      id:             1,
      external_name:  external.map(Into::into),
      internal_name:  internal.map(Into::into),
      entity_classes: vec![],
    }
  }

  #[test]
  fn external_name_wins() {
    assert_eq!(entity(Some("orders"), Some("Orders")).display_name(), "orders");
  }

  #[test]
  fn empty_external_name_falls_through() {
    assert_eq!(entity(Some(""), Some("Orders")).display_name(), "Orders");
  }

  #[test]
  fn nameless_entity_is_empty() {
    assert_eq!(entity(None, None).display_name(), "");
  }
}
