//! Diagnostic listing of configured asset groups.

use std::collections::BTreeMap;

/// Collaborator describing asset groups per category and which of them are precompiled.
pub trait GroupManifest {
  /// Category (for example `css`) to member group names, in configured order.
  fn asset_groups(&self) -> &BTreeMap<String, Vec<String>>;

  /// Category to the names of groups that are already compiled.
  fn compiled_groups(&self) -> &BTreeMap<String, Vec<String>>;
}

/// Groups of one category with their compiled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupListing {
  /// Category name.
  pub category: String,
  /// Groups in configured order.
  pub groups: Vec<GroupStatus>,
}

/// A single group and whether it is precompiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStatus {
  /// Group name.
  pub name: String,
  /// `true` when the group is in the compiled set of its category.
  pub compiled: bool,
}

/// List every group of every category, flagging the precompiled ones.
pub fn list_groups<M: GroupManifest + ?Sized>(manifest: &M) -> Vec<GroupListing> {
  let compiled = manifest.compiled_groups();

  manifest
    .asset_groups()
    .iter()
    .map(|(category, groups)| {
      let compiled_in_category = compiled.get(category);
      GroupListing {
        category: category.clone(),
        groups: groups
          .iter()
          .map(|name| GroupStatus {
            name: name.clone(),
            compiled: compiled_in_category.is_some_and(|set| set.contains(name)),
          })
          .collect(),
      }
    })
    .collect()
}

/// Render listings as console lines: a header per category, then one line per group.
pub fn render_group_listing(listings: &[GroupListing]) -> Vec<String> {
  let mut lines = Vec::new();
  for listing in listings {
    lines.push(String::new());
    lines.push(format!("{} groups:", capitalize(&listing.category)));
    for group in &listing.groups {
      if group.compiled {
        lines.push(format!("{} (compiled)", group.name));
      } else {
        lines.push(group.name.clone());
      }
    }
  }
  lines
}

fn capitalize(value: &str) -> String {
  let mut chars = value.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
