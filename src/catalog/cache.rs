use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::compiler::{CompilerConfig, CompilerRunner};
use crate::error::{Result, SourceMapError};
use crate::position::PositionGroup;

use super::asm::extract_positions;
use super::units::{first_json_object, split_units};

/// Position groups for every contract of every compiled file.
///
/// Each file is compiled at most once until it is invalidated. Paths are
/// keyed with `.` components removed, so `./Foo.sol` and `Foo.sol` share an
/// entry; other spellings of the same file (absolute vs relative, symlinks)
/// are compiled separately.
#[derive(Debug, Default)]
pub struct PositionCatalog {
    config: CompilerConfig,
    files: HashMap<PathBuf, HashMap<String, PositionGroup>>,
}

impl PositionCatalog {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            files: HashMap::new(),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn is_built(&self, path: &Path) -> bool {
        self.files.contains_key(&cache_key(path))
    }

    /// Compile `path` and record its groups, unless already done.
    pub fn ensure_built(&mut self, path: &Path, runner: &dyn CompilerRunner) -> Result<()> {
        if self.is_built(path) {
            return Ok(());
        }

        let outputs = runner.run(self.config.command_template(), path)?;
        let output = outputs.first().ok_or(SourceMapError::EmptyOutput)?;
        let groups = parse_groups(output);

        tracing::debug!(
            path = %path.display(),
            contracts = groups.len(),
            "built position catalog"
        );

        self.files.insert(cache_key(path), groups);
        Ok(())
    }

    pub fn lookup(&self, path: &Path, contract: &str) -> Result<PositionGroup> {
        self.files
            .get(&cache_key(path))
            .and_then(|groups| groups.get(contract))
            .cloned()
            .ok_or_else(|| SourceMapError::UnknownContract {
                contract: contract.to_string(),
                path: path.to_path_buf(),
            })
    }

    /// Unit names found for `path`, sorted.
    pub fn contracts(&self, path: &Path) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .files
            .get(&cache_key(path))
            .map(|groups| groups.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.files.remove(&cache_key(path));
    }

    pub fn reset(&mut self) {
        self.files.clear();
    }
}

fn cache_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Turn raw compiler output into one group per unit, skipping units that
/// don't hold a readable assembly object.
fn parse_groups(output: &str) -> HashMap<String, PositionGroup> {
    let mut groups = HashMap::new();

    for unit in split_units(output) {
        let Some(json) = first_json_object(unit.body) else {
            tracing::warn!(unit = unit.name, "no assembly object in unit, skipping");
            continue;
        };
        match extract_positions(json) {
            Ok(positions) => {
                groups.insert(unit.name.to_string(), PositionGroup::from(positions));
            }
            Err(err) => {
                tracing::warn!(unit = unit.name, %err, "unreadable assembly, skipping");
            }
        }
    }

    groups
}

/// A catalog that can be handed to several threads.
///
/// The check and the build happen under one lock, so a file is never
/// compiled twice concurrently.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<Mutex<PositionCatalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: PositionCatalog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(catalog)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, PositionCatalog> {
        // The catalog is only mutated by whole-file inserts and removals.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ensure_built(&self, path: &Path, runner: &dyn CompilerRunner) -> Result<()> {
        self.lock().ensure_built(path, runner)
    }

    pub fn lookup(&self, path: &Path, contract: &str) -> Result<PositionGroup> {
        self.lock().lookup(path, contract)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::PositionEntry;
    use std::cell::Cell;

    struct Canned {
        output: &'static str,
        calls: Cell<usize>,
    }

    impl Canned {
        fn new(output: &'static str) -> Self {
            Self {
                output,
                calls: Cell::new(0),
            }
        }
    }

    impl CompilerRunner for Canned {
        fn run(&self, _template: &str, _path: &Path) -> Result<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![self.output.to_string(), String::new()])
        }
    }

    const OUTPUT: &str = "\n======= t.sol:A =======\nEVM assembly:\n\
        {\".code\":[{\"name\":\"PUSH\",\"begin\":0,\"end\":5},{\"name\":\"tag\",\"begin\":0,\"end\":5},\
        {\"name\":\"STOP\",\"begin\":-1,\"end\":-1}]}{\".code\":[]}\n\
        ======= t.sol:Broken =======\nEVM assembly:\n{\".code\": [oops]}\n\
        ======= t.sol:B =======\nEVM assembly:\n{\".code\":[]}\n";

    #[test]
    fn builds_once_per_path() {
        let runner = Canned::new(OUTPUT);
        let mut catalog = PositionCatalog::default();
        let path = Path::new("t.sol");

        catalog.ensure_built(path, &runner).unwrap();
        catalog.ensure_built(path, &runner).unwrap();
        assert_eq!(runner.calls.get(), 1);
        assert!(catalog.is_built(path));

        catalog.ensure_built(Path::new("other.sol"), &runner).unwrap();
        assert_eq!(runner.calls.get(), 2);
    }

    #[test]
    fn groups_skip_tags_and_broken_units() {
        let runner = Canned::new(OUTPUT);
        let mut catalog = PositionCatalog::default();
        let path = Path::new("t.sol");
        catalog.ensure_built(path, &runner).unwrap();

        assert_eq!(catalog.contracts(path), ["t.sol:A", "t.sol:B"]);
        let group = catalog.lookup(path, "t.sol:A").unwrap();
        assert_eq!(
            &group[..],
            &[PositionEntry::new(0, 5), PositionEntry::new(-1, -1)]
        );
        assert!(catalog.lookup(path, "t.sol:B").unwrap().is_empty());
    }

    #[test]
    fn unknown_contract_is_an_error() {
        let runner = Canned::new(OUTPUT);
        let mut catalog = PositionCatalog::default();
        let path = Path::new("t.sol");
        catalog.ensure_built(path, &runner).unwrap();

        let err = catalog.lookup(path, "t.sol:Broken").unwrap_err();
        assert!(matches!(err, SourceMapError::UnknownContract { .. }));
        assert!(catalog.lookup(Path::new("never.sol"), "A").is_err());
    }

    #[test]
    fn invalidate_and_reset_force_rebuild() {
        let runner = Canned::new(OUTPUT);
        let shared = SharedCatalog::default();
        let path = Path::new("t.sol");

        shared.ensure_built(path, &runner).unwrap();
        shared.lock().invalidate(path);
        shared.ensure_built(path, &runner).unwrap();
        shared.reset();
        assert!(!shared.lock().is_built(path));
        shared.ensure_built(path, &runner).unwrap();
        assert_eq!(runner.calls.get(), 3);
    }

    #[test]
    fn failed_compile_leaves_path_unbuilt() {
        struct Failing;
        impl CompilerRunner for Failing {
            fn run(&self, template: &str, _path: &Path) -> Result<Vec<String>> {
                Err(SourceMapError::Template(template.to_string()))
            }
        }
        let mut catalog = PositionCatalog::default();
        let path = Path::new("t.sol");
        assert!(catalog.ensure_built(path, &Failing).is_err());
        assert!(!catalog.is_built(path));

        let runner = Canned::new(OUTPUT);
        catalog.ensure_built(path, &runner).unwrap();
        assert!(catalog.is_built(path));
    }

    #[test]
    fn current_dir_prefix_shares_an_entry() {
        let runner = Canned::new(OUTPUT);
        let mut catalog = PositionCatalog::default();

        catalog.ensure_built(Path::new("./t.sol"), &runner).unwrap();
        catalog.ensure_built(Path::new("t.sol"), &runner).unwrap();
        assert_eq!(runner.calls.get(), 1);
        assert!(catalog.lookup(Path::new("t.sol"), "t.sol:A").is_ok());

        catalog.invalidate(Path::new("./t.sol"));
        assert!(!catalog.is_built(Path::new("t.sol")));
    }

    #[test]
    fn empty_runner_output_is_an_error() {
        struct Silent;
        impl CompilerRunner for Silent {
            fn run(&self, _template: &str, _path: &Path) -> Result<Vec<String>> {
                Ok(Vec::new())
            }
        }
        let mut catalog = PositionCatalog::default();
        let err = catalog.ensure_built(Path::new("t.sol"), &Silent).unwrap_err();
        assert!(matches!(err, SourceMapError::EmptyOutput));
    }
}
