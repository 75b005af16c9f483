//! `setup:repository` scaffolding
//!
//! Creates a repository module (interface trait, SeaORM hooks implementation
//! and `mod.rs`) under the configured repository directory, then registers it
//! in the shared provider file. Templates are embedded at compile time and
//! filled by literal placeholder substitution.
//!
//! # Invariants
//! - An existing repository directory aborts the run before anything is written.
//! - Provider markers survive every run, and an entry already present is
//!   never inserted twice.
//! - Every new module is declared in its parent (`mod.rs`, `<name>.rs` or the
//!   crate root under `app_path`), at most once.

use heck::{ToSnakeCase, ToUpperCamelCase};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::{GeneratorError, GeneratorResult};

const INTERFACE_STUB: &str = include_str!("templates/interface.repository.stub");
const IMPLEMENT_STUB: &str = include_str!("templates/implement.repository.stub");
const MODULE_STUB: &str = include_str!("templates/module.repository.stub");
const PROVIDER_STUB: &str = include_str!("templates/provider.repository.stub");

const MARKER_INTERFACE_NAMESPACE: &str = "#InterfaceNamespace";
const MARKER_CLASS_NAMESPACE: &str = "#ClassNamespace";
const MARKER_SINGLETON: &str = "#Singleton";
const MARKER_INTERFACE_PROVIDES: &str = "#InterfaceProvides";

/// Names and paths derived from one `setup:repository <name>` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPlan {
    /// Model name in UpperCamelCase
    pub model_name: String,
    /// Model name in snake_case; also the container key
    pub model_key: String,
    /// Module path of the repository directory
    pub namespace: String,
    pub interface_name: String,
    pub class_name: String,
    pub interface_module: String,
    pub class_module: String,
    pub directory: PathBuf,
    pub interface_file: PathBuf,
    pub class_file: PathBuf,
    pub module_file: PathBuf,
    pub provider_file: PathBuf,
    /// Modules from `app_path` down to the repository module
    pub module_chain: Vec<String>,
    /// Modules from `app_path` down to the provider module
    pub provider_chain: Vec<String>,
}

impl RepositoryPlan {
    fn substitutions(&self) -> [(&'static str, &str); 6] {
        // Longest placeholders first.
        [
            ("#RepositoryInterfaceName", self.interface_name.as_str()),
            ("#RepositoryClassName", self.class_name.as_str()),
            ("#InterfaceModule", self.interface_module.as_str()),
            ("#ClassModule", self.class_module.as_str()),
            ("#ModelName", self.model_name.as_str()),
            ("#ModelKey", self.model_key.as_str()),
        ]
    }

    /// Fill the placeholders of a repository template
    pub fn render(&self, stub: &str) -> String {
        self.substitutions()
            .iter()
            .fold(stub.to_string(), |text, (placeholder, value)| {
                text.replace(placeholder, value)
            })
    }

    /// Entries this repository adds to the provider, keyed by marker
    pub fn provider_entries(&self) -> [(&'static str, String); 4] {
        [
            (
                MARKER_INTERFACE_NAMESPACE,
                format!("pub use {}::{};", self.namespace, self.interface_name),
            ),
            (
                MARKER_CLASS_NAMESPACE,
                format!("pub use {}::{};", self.namespace, self.class_name),
            ),
            (
                MARKER_SINGLETON,
                format!(
                    "container.singleton(\"{}\", {});",
                    self.interface_name, self.class_name
                ),
            ),
            (MARKER_INTERFACE_PROVIDES, format!("\"{}\",", self.interface_name)),
        ]
    }
}

/// Files written by a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRepository {
    pub plan: RepositoryPlan,
    /// Whether the provider file was created by this run
    pub provider_created: bool,
    /// Parent module files that received a `pub mod` declaration
    pub declared_in: Vec<PathBuf>,
}

/// Scaffolds repositories according to a [`Config`]
#[derive(Debug, Clone)]
pub struct RepositoryGenerator {
    config: Config,
}

impl RepositoryGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compute names and paths for `name` without touching the file system
    pub fn plan(&self, name: &str) -> GeneratorResult<RepositoryPlan> {
        let name = name.trim();
        validate_name(name)?;

        let model_name = name.to_upper_camel_case();
        let model_key = name.to_snake_case();

        let directory = self.config.repository_root().join(&model_key);

        let mut module_chain = self.config.repository_segments();
        module_chain.push(model_key.clone());

        let mut namespace = vec![self.config.crate_path.clone()];
        namespace.extend(module_chain.iter().cloned());

        let provider_chain: Vec<String> = self
            .config
            .provider_path
            .with_extension("")
            .iter()
            .map(|component| component.to_string_lossy().into_owned())
            .collect();

        let interface_module = format!("{model_key}_repository_interface");
        let class_module = format!("{model_key}_sea_orm_repository");

        Ok(RepositoryPlan {
            interface_name: format!("{model_name}RepositoryInterface"),
            class_name: format!("{model_name}SeaOrmRepository"),
            interface_file: directory.join(format!("{interface_module}.rs")),
            class_file: directory.join(format!("{class_module}.rs")),
            module_file: directory.join("mod.rs"),
            provider_file: self.config.provider_file(),
            namespace: namespace.join("::"),
            module_chain,
            provider_chain,
            interface_module,
            class_module,
            directory,
            model_name,
            model_key,
        })
    }

    /// Create the repository files for `name` and register them
    ///
    /// # Errors
    /// - `InvalidName` when `name` is not an identifier
    /// - `AlreadyExists` when the repository directory exists; nothing is written
    /// - `Io` on file system failures
    pub fn generate(&self, name: &str) -> GeneratorResult<GeneratedRepository> {
        let plan = self.plan(name)?;

        if plan.directory.exists() {
            return Err(GeneratorError::AlreadyExists {
                name: plan.model_name.clone(),
                path: plan.directory.clone(),
            });
        }

        fs::create_dir_all(&plan.directory)?;
        fs::write(&plan.class_file, plan.render(IMPLEMENT_STUB))?;
        fs::write(&plan.interface_file, plan.render(INTERFACE_STUB))?;
        fs::write(&plan.module_file, plan.render(MODULE_STUB))?;
        debug!("Wrote repository files under {}", plan.directory.display());

        let provider_created = upsert_provider(&plan)?;

        let mut declared_in = declare_chain(&self.config.app_path, &plan.module_chain)?;
        for file in declare_chain(&self.config.app_path, &plan.provider_chain)? {
            if !declared_in.contains(&file) {
                declared_in.push(file);
            }
        }

        info!("Repository {} created", plan.model_name);
        Ok(GeneratedRepository {
            plan,
            provider_created,
            declared_in,
        })
    }
}

fn validate_name(name: &str) -> GeneratorResult<()> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(GeneratorError::invalid_name(name, "name is empty")),
        Some(first) if !first.is_ascii_alphabetic() => {
            return Err(GeneratorError::invalid_name(name, "must start with a letter"));
        }
        Some(_) => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(GeneratorError::invalid_name(
            name,
            "only letters, digits and underscores are allowed",
        ));
    }
    Ok(())
}

/// Insert this repository's entries into the provider file
///
/// Returns whether the provider file had to be created.
fn upsert_provider(plan: &RepositoryPlan) -> GeneratorResult<bool> {
    let created = !plan.provider_file.exists();
    let mut content = if created {
        PROVIDER_STUB.to_string()
    } else {
        fs::read_to_string(&plan.provider_file)?
    };

    for (marker, entry) in plan.provider_entries() {
        content = insert_before_marker(&content, marker, &entry);
    }

    if let Some(parent) = plan.provider_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&plan.provider_file, content)?;
    debug!(
        "{} provider {}",
        if created { "Created" } else { "Updated" },
        plan.provider_file.display()
    );
    Ok(created)
}

/// Declare every module of `chain` in its parent below `root`
///
/// The first module goes into `root/lib.rs` (or `root/main.rs`) when the crate
/// root lives there. Deeper modules go into `<parent>.rs` when that file
/// exists, else into `<parent>/mod.rs`, which is created if missing.
fn declare_chain(root: &Path, chain: &[String]) -> GeneratorResult<Vec<PathBuf>> {
    let mut declared_in = Vec::new();
    let mut parent_file = ["lib.rs", "main.rs"]
        .iter()
        .map(|file| root.join(file))
        .find(|file| file.is_file());
    let mut directory = root.to_path_buf();

    for module in chain {
        if let Some(file) = &parent_file {
            if declare_module(file, module)? {
                declared_in.push(file.clone());
            }
        }
        directory.push(module);
        let flat = directory.with_extension("rs");
        parent_file = Some(if flat.is_file() { flat } else { directory.join("mod.rs") });
    }
    Ok(declared_in)
}

/// Append `pub mod <module>;` to `file` unless it already declares it
fn declare_module(file: &Path, module: &str) -> GeneratorResult<bool> {
    let mut content = if file.exists() {
        fs::read_to_string(file)?
    } else {
        String::new()
    };
    if declares_module(&content, module) {
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&format!("pub mod {module};\n"));

    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, content)?;
    debug!("Declared module {} in {}", module, file.display());
    Ok(true)
}

/// Whether `content` holds a `mod <module>;` line with any visibility
pub fn declares_module(content: &str, module: &str) -> bool {
    let declaration = format!("mod {module};");
    content.lines().any(|line| {
        line.trim()
            .strip_suffix(declaration.as_str())
            .is_some_and(|visibility| visibility.is_empty() || visibility.ends_with(' '))
    })
}

/// Put `entry` on its own line above the line holding `marker`
///
/// The entry takes the marker line's indentation. Content without the marker,
/// or already holding the entry, is returned unchanged.
pub fn insert_before_marker(content: &str, marker: &str, entry: &str) -> String {
    if content.lines().any(|line| line.trim() == entry) {
        return content.to_string();
    }

    let mut output = String::with_capacity(content.len() + entry.len() + 8);
    let mut inserted = false;
    for line in content.split_inclusive('\n') {
        if !inserted && line.contains(marker) {
            let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
            output.push_str(&indent);
            output.push_str(entry);
            output.push('\n');
            inserted = true;
        }
        output.push_str(line);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> RepositoryGenerator {
        RepositoryGenerator::new(Config::default())
    }

    #[test]
    fn plan_derives_names_and_paths() {
        let plan = generator().plan("  user_profile ").unwrap();
        assert_eq!(plan.model_name, "UserProfile");
        assert_eq!(plan.model_key, "user_profile");
        assert_eq!(plan.interface_name, "UserProfileRepositoryInterface");
        assert_eq!(plan.class_name, "UserProfileSeaOrmRepository");
        assert_eq!(plan.namespace, "crate::repositories::user_profile");
        assert_eq!(plan.directory, PathBuf::from("src/repositories/user_profile"));
        assert_eq!(
            plan.interface_file,
            PathBuf::from("src/repositories/user_profile/user_profile_repository_interface.rs")
        );
    }

    #[test]
    fn nested_repository_path_becomes_module_path() {
        let config = Config {
            path_repository: "Data/Repositories".to_string(),
            ..Config::default()
        };
        let plan = RepositoryGenerator::new(config).plan("Order").unwrap();
        assert_eq!(plan.namespace, "crate::data::repositories::order");
        assert_eq!(plan.directory, PathBuf::from("src/data/repositories/order"));
    }

    #[test]
    fn rejects_names_that_are_not_identifiers() {
        for name in ["", "   ", "9lives", "user-profile", "a b"] {
            let err = generator().plan(name).unwrap_err();
            assert!(matches!(err, GeneratorError::InvalidName { .. }), "{name:?}");
        }
    }

    #[test]
    fn render_fills_every_placeholder() {
        let plan = generator().plan("User").unwrap();
        let placeholders = ["#Model", "#Repository", "#InterfaceModule", "#ClassModule"];
        for stub in [INTERFACE_STUB, IMPLEMENT_STUB, MODULE_STUB] {
            let rendered = plan.render(stub);
            for placeholder in placeholders {
                assert!(!rendered.contains(placeholder), "{placeholder} left in:\n{rendered}");
            }
        }
        let interface = plan.render(INTERFACE_STUB);
        assert!(interface.contains("pub trait UserRepositoryInterface"));
        assert!(interface.contains("const MODEL: &'static str = \"user\";"));
        assert!(interface.contains("pub type UserRepository<S, H>"));
    }

    #[test]
    fn plan_lists_module_chains() {
        let plan = generator().plan("User").unwrap();
        assert_eq!(plan.module_chain, vec!["repositories", "user"]);
        assert_eq!(plan.provider_chain, vec!["providers", "repository_provider"]);
    }

    #[test]
    fn declares_module_accepts_any_visibility() {
        assert!(declares_module("pub mod user;\n", "user"));
        assert!(declares_module("mod user;", "user"));
        assert!(declares_module("    pub(crate) mod user;", "user"));
        assert!(!declares_module("pub mod super_user;", "user"));
        assert!(!declares_module("pub mod users;", "user"));
        assert!(!declares_module("// pub mod other;", "user"));
    }

    #[test]
    fn insert_before_marker_keeps_marker_and_indentation() {
        let content = "fn register() {\n    // #Singleton\n}\n";
        let once = insert_before_marker(content, MARKER_SINGLETON, "a();");
        assert_eq!(once, "fn register() {\n    a();\n    // #Singleton\n}\n");

        let twice = insert_before_marker(&once, MARKER_SINGLETON, "a();");
        assert_eq!(twice, once);

        let missing = insert_before_marker("no markers\n", MARKER_SINGLETON, "a();");
        assert_eq!(missing, "no markers\n");
    }
}
