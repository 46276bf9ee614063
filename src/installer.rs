//! Installs and removes the "Convert to &HTML" context-menu verb.
//!
//! The installer is written against the [`RegistryStore`] trait so its state
//! logic (overwrite semantics, icon handling, post-order subtree removal) is
//! exercised by tests with an in-memory store; the Windows implementation
//! lives in `registry.rs`.

use anyhow::Result;
use std::path::Path;

/// The verb's subtree under HKCU.
pub const VERB_KEY: &str = r"Software\Classes\SystemFileAssociations\.md\shell\cthtml";
/// The `command` subkey holding the verb's command line as its default value.
pub const COMMAND_KEY: &str =
    r"Software\Classes\SystemFileAssociations\.md\shell\cthtml\command";
/// Named value on the verb key pointing at the icon resource.
pub const ICON_VALUE: &str = "Icon";
/// Menu entry label.
pub const VERB_LABEL: &str = "Convert to &HTML";

/// Minimal hierarchical string store, HKCU-rooted with `\`-separated key
/// paths. Deleting things that do not exist succeeds; `delete_key` only
/// accepts childless keys, which is what forces post-order removal.
pub trait RegistryStore {
    /// Write a string value, creating intermediate keys. `None` names the
    /// key's default value.
    fn set_value(&mut self, key: &str, name: Option<&str>, data: &str) -> Result<()>;
    /// Delete a named value; a missing value or key is success.
    fn delete_value(&mut self, key: &str, name: &str) -> Result<()>;
    /// Immediate subkey names of `key`; a missing key yields an empty list.
    fn subkeys(&self, key: &str) -> Result<Vec<String>>;
    /// Delete a childless key; a missing key is success.
    fn delete_key(&mut self, key: &str) -> Result<()>;
}

/// The target installed state of the verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbRegistration {
    pub command: String,
    pub label: String,
    pub icon: Option<String>,
}

impl VerbRegistration {
    /// The command value must reproduce this exact invocation so the shell
    /// hands the selected file over as `/Markdown:"<path>"`.
    pub fn for_launcher(launcher: &Path, with_icon: bool) -> Self {
        let launcher = launcher.display().to_string();
        Self {
            command: format!("\"{launcher}\" /Markdown:\"%1\""),
            label: VERB_LABEL.to_string(),
            icon: with_icon.then(|| launcher.clone()),
        }
    }
}

/// Write the verb registration, overwriting whatever was there before.
/// Last writer wins; no prior state is merged.
pub fn install(store: &mut dyn RegistryStore, launcher: &Path, with_icon: bool) -> Result<()> {
    let reg = VerbRegistration::for_launcher(launcher, with_icon);
    tracing::info!(command = %reg.command, with_icon, "installing shell verb");
    store.set_value(COMMAND_KEY, None, &reg.command)?;
    store.set_value(VERB_KEY, None, &reg.label)?;
    match &reg.icon {
        Some(icon) => store.set_value(VERB_KEY, Some(ICON_VALUE), icon)?,
        None => store.delete_value(VERB_KEY, ICON_VALUE)?,
    }
    Ok(())
}

/// Remove the verb subtree recursively. A tree that never existed is not an
/// error.
pub fn uninstall(store: &mut dyn RegistryStore) -> Result<()> {
    tracing::info!(key = VERB_KEY, "removing shell verb");
    delete_tree(store, VERB_KEY)
}

/// Post-order removal: the store can only delete a key once it has no
/// children, so each child subtree goes before its parent.
fn delete_tree(store: &mut dyn RegistryStore, key: &str) -> Result<()> {
    for child in store.subkeys(key)? {
        delete_tree(store, &format!("{key}\\{child}"))?;
    }
    store.delete_key(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    /// In-memory store that enforces the real registry's childless-delete
    /// rule, so a wrong traversal order fails the test.
    #[derive(Default)]
    struct MemStore {
        // key path -> value name ("" for default) -> data
        keys: BTreeMap<String, BTreeMap<String, String>>,
    }

    impl MemStore {
        fn children_of(&self, key: &str) -> Vec<String> {
            let prefix = format!("{key}\\");
            let mut names: Vec<String> = self
                .keys
                .keys()
                .filter_map(|k| k.strip_prefix(&prefix))
                .map(|rest| rest.split('\\').next().unwrap().to_string())
                .collect();
            names.dedup();
            names
        }

        fn value(&self, key: &str, name: &str) -> Option<&str> {
            self.keys.get(key).and_then(|v| v.get(name)).map(|s| s.as_str())
        }
    }

    impl RegistryStore for MemStore {
        fn set_value(&mut self, key: &str, name: Option<&str>, data: &str) -> Result<()> {
            // Creating a key implicitly creates its ancestors.
            let mut path = String::new();
            for part in key.split('\\') {
                if !path.is_empty() {
                    path.push('\\');
                }
                path.push_str(part);
                self.keys.entry(path.clone()).or_default();
            }
            self.keys
                .get_mut(key)
                .unwrap()
                .insert(name.unwrap_or("").to_string(), data.to_string());
            Ok(())
        }

        fn delete_value(&mut self, key: &str, name: &str) -> Result<()> {
            if let Some(values) = self.keys.get_mut(key) {
                values.remove(name);
            }
            Ok(())
        }

        fn subkeys(&self, key: &str) -> Result<Vec<String>> {
            Ok(self.children_of(key))
        }

        fn delete_key(&mut self, key: &str) -> Result<()> {
            if self.keys.contains_key(key) && !self.children_of(key).is_empty() {
                bail!("key {key} still has subkeys");
            }
            self.keys.remove(key);
            Ok(())
        }
    }

    fn launcher() -> PathBuf {
        PathBuf::from(r"C:\Tools\cvmd2html.exe")
    }

    #[test]
    fn install_writes_command_label_and_icon() {
        let mut store = MemStore::default();
        install(&mut store, &launcher(), true).unwrap();
        assert_eq!(
            store.value(COMMAND_KEY, ""),
            Some(r#""C:\Tools\cvmd2html.exe" /Markdown:"%1""#)
        );
        assert_eq!(store.value(VERB_KEY, ""), Some("Convert to &HTML"));
        assert_eq!(store.value(VERB_KEY, "Icon"), Some(r"C:\Tools\cvmd2html.exe"));
    }

    #[test]
    fn last_install_decides_icon_presence() {
        let mut store = MemStore::default();
        install(&mut store, &launcher(), false).unwrap();
        install(&mut store, &launcher(), true).unwrap();
        assert!(store.value(VERB_KEY, "Icon").is_some());

        install(&mut store, &launcher(), true).unwrap();
        install(&mut store, &launcher(), false).unwrap();
        assert!(store.value(VERB_KEY, "Icon").is_none());
    }

    #[test]
    fn install_is_idempotent() {
        let mut a = MemStore::default();
        let mut b = MemStore::default();
        install(&mut a, &launcher(), true).unwrap();
        install(&mut b, &launcher(), true).unwrap();
        install(&mut b, &launcher(), true).unwrap();
        assert_eq!(a.keys, b.keys);
    }

    #[test]
    fn uninstall_removes_the_whole_subtree() {
        let mut store = MemStore::default();
        install(&mut store, &launcher(), true).unwrap();
        // A stray grandchild key must not orphan the traversal.
        store
            .set_value(&format!("{COMMAND_KEY}\\stale\\deeper"), None, "x")
            .unwrap();
        uninstall(&mut store).unwrap();
        assert!(!store.keys.keys().any(|k| k.starts_with(VERB_KEY)));
    }

    #[test]
    fn uninstall_of_absent_tree_is_a_noop() {
        let mut store = MemStore::default();
        uninstall(&mut store).unwrap();
        uninstall(&mut store).unwrap();
        assert!(store.keys.is_empty());
    }
}
