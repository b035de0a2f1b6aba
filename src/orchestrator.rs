//! The install run, as an explicit sequential state machine
//!
//! `DetectArch → InstallRuntimeLib → InstallUiFramework → InstallMainPackage
//! → UpdatePath → Cleanup → Done`, with a single Failed terminal reachable
//! from any step. No rollback: a partial install is an accepted end state.
//!
//! Network access, the deployment facility and the environment store sit
//! behind traits so every scenario is exercisable without a Windows host.

use std::fs;
use std::path::Path;

use console::Style;
use regex::Regex;

use crate::cleanup::TempArtifacts;
use crate::context::{AlternateSource, DependencySpec, RunContext};
use crate::error::{Result, WingstrapError};
use crate::extract;
use crate::installer::{Installer, PackageEngine, PackageRef};
use crate::net::HttpClient;
use crate::pathenv::{self, EnvPathStore};
use crate::resolver::{self, Release, StoreQuery};

/// Steps of the run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    DetectArch,
    InstallRuntimeLib,
    InstallUiFramework,
    InstallMainPackage,
    UpdatePath,
    Cleanup,
    Done,
}

impl Step {
    pub fn describe(&self) -> &'static str {
        match self {
            Step::DetectArch => "detecting CPU architecture",
            Step::InstallRuntimeLib => "installing the VCLibs runtime framework",
            Step::InstallUiFramework => "installing the UI.Xaml framework",
            Step::InstallMainPackage => "installing winget",
            Step::UpdatePath => "updating the Path variable",
            Step::Cleanup => "cleaning up temporary files",
            Step::Done => "done",
        }
    }
}

/// A run failure, tagged with the step that triggered it
#[derive(Debug)]
pub struct RunFailure {
    pub step: Step,
    pub error: WingstrapError,
}

/// Which source path satisfied a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePath {
    Primary,
    Alternate,
}

/// Seam over everything that talks to the network
pub trait DependencyProvider {
    /// Primary source: store package-index lookup
    fn resolve_store_package(&self, query: &StoreQuery, pattern: &Regex) -> Result<String>;

    /// Latest-release metadata for a repository
    fn latest_release(&self, owner: &str, repo: &str) -> Result<Release>;

    /// Download a URL to a local file
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Real provider, backed by the blocking HTTP client
pub struct HttpProvider {
    client: HttpClient,
}

impl HttpProvider {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
        })
    }
}

impl DependencyProvider for HttpProvider {
    fn resolve_store_package(&self, query: &StoreQuery, pattern: &Regex) -> Result<String> {
        resolver::resolve_package_url(&self.client, query, pattern)
    }

    fn latest_release(&self, owner: &str, repo: &str) -> Result<Release> {
        resolver::assets::latest_release(&self.client, owner, repo)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.client.download_file(url, dest)
    }
}

/// Attempt the primary source; on any failure warn and attempt the alternate.
///
/// The alternate runs when, and only when, the primary fails. An alternate
/// failure propagates as-is (benign install conditions were already absorbed
/// by the installer wrap).
pub fn with_fallback<P, A>(name: &str, primary: P, alternate: A) -> Result<SourcePath>
where
    P: FnOnce() -> Result<()>,
    A: FnOnce() -> Result<()>,
{
    match primary() {
        Ok(()) => Ok(SourcePath::Primary),
        Err(primary_err) => {
            eprintln!(
                "{} primary source for {} failed ({}), trying alternate source",
                Style::new().yellow().bold().apply_to("warning:"),
                name,
                primary_err
            );
            alternate()?;
            Ok(SourcePath::Alternate)
        }
    }
}

/// Sequences the whole run
pub struct Orchestrator<'a> {
    ctx: &'a RunContext,
    provider: &'a dyn DependencyProvider,
    engine: &'a dyn PackageEngine,
    path_store: &'a dyn EnvPathStore,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        ctx: &'a RunContext,
        provider: &'a dyn DependencyProvider,
        engine: &'a dyn PackageEngine,
        path_store: &'a dyn EnvPathStore,
    ) -> Self {
        Self {
            ctx,
            provider,
            engine,
            path_store,
        }
    }

    /// Run every step after architecture detection. Cleanup runs
    /// unconditionally on the successful path only.
    pub fn run(&self) -> std::result::Result<(), RunFailure> {
        let mut artifacts = TempArtifacts::new();

        self.step(Step::InstallRuntimeLib);
        self.install_runtime_lib()
            .map_err(|error| RunFailure {
                step: Step::InstallRuntimeLib,
                error,
            })?;

        self.step(Step::InstallUiFramework);
        self.install_ui_framework(&mut artifacts)
            .map_err(|error| RunFailure {
                step: Step::InstallUiFramework,
                error,
            })?;

        self.step(Step::InstallMainPackage);
        self.install_main_package(&mut artifacts)
            .map_err(|error| RunFailure {
                step: Step::InstallMainPackage,
                error,
            })?;

        self.step(Step::UpdatePath);
        pathenv::update_search_path(self.path_store, &self.ctx.apps_dir).map_err(|error| {
            RunFailure {
                step: Step::UpdatePath,
                error,
            }
        })?;

        self.step(Step::Cleanup);
        artifacts.remove_all();

        self.step(Step::Done);
        Ok(())
    }

    fn step(&self, step: Step) {
        println!(
            "{} {}",
            Style::new().green().bold().apply_to("=>"),
            step.describe()
        );
    }

    fn installer(&self) -> Installer<'_> {
        Installer::new(self.engine)
    }

    /// Create the run's scratch directory on first use
    fn ensure_temp_dir(&self, artifacts: &mut TempArtifacts) -> Result<()> {
        if !self.ctx.temp_dir.exists() {
            fs::create_dir_all(&self.ctx.temp_dir)?;
            artifacts.register(&self.ctx.temp_dir);
            if self.ctx.verbose {
                println!("  scratch directory: {}", self.ctx.temp_dir.display());
            }
        }
        Ok(())
    }

    /// Store lookup + install; the shared primary path for both dependencies
    fn install_from_store(&self, dep: &DependencySpec) -> Result<()> {
        let query = StoreQuery::family(dep.package_family);
        let url = self
            .provider
            .resolve_store_package(&query, &dep.package_pattern)?;
        self.installer()
            .install(dep.name, &PackageRef::Remote(url))?;
        Ok(())
    }

    fn install_runtime_lib(&self) -> Result<()> {
        let dep = &self.ctx.runtime_lib;
        let AlternateSource::PinnedUrl(pinned) = &dep.alternate else {
            return Err(WingstrapError::InstallFailed {
                package: dep.name.to_string(),
                reason: "runtime library alternate must be a pinned URL".to_string(),
            });
        };

        with_fallback(
            dep.name,
            || self.install_from_store(dep),
            || {
                self.installer()
                    .install(dep.name, &PackageRef::Remote(pinned.clone()))?;
                Ok(())
            },
        )?;
        Ok(())
    }

    fn install_ui_framework(&self, artifacts: &mut TempArtifacts) -> Result<()> {
        let dep = &self.ctx.ui_framework;
        let AlternateSource::RegistryArchive { url, package_subdir } = &dep.alternate else {
            return Err(WingstrapError::InstallFailed {
                package: dep.name.to_string(),
                reason: "UI framework alternate must be a registry archive".to_string(),
            });
        };

        with_fallback(
            dep.name,
            || self.install_from_store(dep),
            || self.install_from_archive(dep, url, package_subdir, artifacts),
        )?;
        Ok(())
    }

    /// Alternate path for the UI framework: download the registry archive,
    /// extract it, and install every architecture-specific package inside
    fn install_from_archive(
        &self,
        dep: &DependencySpec,
        url: &str,
        package_subdir: &str,
        artifacts: &mut TempArtifacts,
    ) -> Result<()> {
        self.ensure_temp_dir(artifacts)?;
        let archive_path = self.ctx.temp_dir.join("Microsoft.UI.Xaml.zip");
        self.provider.download(url, &archive_path)?;

        let extract_dir = self.ctx.temp_dir.join("ui-xaml");
        extract::extract_zip(&archive_path, &extract_dir)?;

        let packages =
            extract::find_packages(&extract_dir, package_subdir, self.ctx.arch.as_str())?;
        let installer = self.installer();
        for package in packages {
            installer.install(dep.name, &PackageRef::Local(package))?;
        }
        Ok(())
    }

    /// Resolve the main package and its license from the latest release, then
    /// run the provisioning install. No fallback behind this path.
    fn install_main_package(&self, artifacts: &mut TempArtifacts) -> Result<()> {
        let spec = &self.ctx.main_package;
        let repo = format!("{}/{}", spec.owner, spec.repo);
        let release = self.provider.latest_release(spec.owner, spec.repo)?;

        let bundle = resolver::resolve_asset(&release, &repo, &spec.bundle_pattern)?;
        let license = resolver::resolve_asset(&release, &repo, &spec.license_pattern)?;

        self.ensure_temp_dir(artifacts)?;
        let bundle_path = self.ctx.temp_dir.join(&bundle.name);
        let license_path = self.ctx.temp_dir.join(&license.name);
        self.provider.download(&bundle.browser_download_url, &bundle_path)?;
        self.provider.download(&license.browser_download_url, &license_path)?;

        self.installer().provision(
            spec.name,
            &PackageRef::Local(bundle_path),
            Some(&license_path),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Architecture;
    use crate::classify::{RawSignal, SAME_VERSION_INSTALLED};
    use crate::pathenv::PathScope;
    use crate::resolver::ReleaseAsset;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    const APPS: &str = r"C:\Users\me\AppData\Local\Microsoft\WindowsApps";

    fn test_context(temp: &TempDir) -> RunContext {
        let mut ctx = RunContext::new(Architecture::X64, false).unwrap();
        ctx.temp_dir = temp.path().join("run");
        ctx.apps_dir = APPS.into();
        ctx
    }

    #[derive(Default)]
    struct FakeProvider {
        /// Package family name -> direct URL; missing key simulates a
        /// lookup failure
        store: HashMap<&'static str, String>,
        release: Option<Release>,
        /// Serve a UI.Xaml-layout zip for URLs ending in this suffix
        archive_suffix: Option<String>,
    }

    impl FakeProvider {
        fn with_store_entries() -> Self {
            let mut store = HashMap::new();
            store.insert(
                "Microsoft.VCLibs.140.00.UWPDesktop_8wekyb3d8bbwe",
                "http://dl.example.net/vclibs_x64.appx".to_string(),
            );
            store.insert(
                "Microsoft.UI.Xaml.2.8_8wekyb3d8bbwe",
                "http://dl.example.net/uixaml_x64.appx".to_string(),
            );
            Self {
                store,
                release: Some(winget_release(true)),
                archive_suffix: None,
            }
        }
    }

    fn winget_release(with_bundle: bool) -> Release {
        let mut assets = vec![ReleaseAsset {
            name: "Microsoft.DesktopAppInstaller_8wekyb3d8bbwe_License1.xml".to_string(),
            browser_download_url: "http://dl.example.net/license.xml".to_string(),
        }];
        if with_bundle {
            assets.push(ReleaseAsset {
                name: "Microsoft.DesktopAppInstaller_8wekyb3d8bbwe.msixbundle".to_string(),
                browser_download_url: "http://dl.example.net/bundle.msixbundle".to_string(),
            });
        }
        Release {
            tag_name: "v1.7.0".to_string(),
            published_at: None,
            assets,
        }
    }

    fn write_ui_xaml_zip(dest: &Path) {
        let file = std::fs::File::create(dest).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer
            .start_file("tools/AppX/x64/Release/Microsoft.UI.Xaml.2.8.appx", options)
            .unwrap();
        writer.write_all(b"appx payload").unwrap();
        writer.finish().unwrap();
    }

    impl DependencyProvider for FakeProvider {
        fn resolve_store_package(&self, query: &StoreQuery, _pattern: &Regex) -> Result<String> {
            self.store
                .get(query.identifier.as_str())
                .cloned()
                .ok_or_else(|| WingstrapError::StoreLookupFailed {
                    identifier: query.identifier.clone(),
                    reason: "service unavailable".to_string(),
                })
        }

        fn latest_release(&self, owner: &str, repo: &str) -> Result<Release> {
            self.release
                .clone()
                .ok_or_else(|| WingstrapError::ReleaseLookupFailed {
                    repo: format!("{owner}/{repo}"),
                    reason: "service unavailable".to_string(),
                })
        }

        fn download(&self, url: &str, dest: &Path) -> Result<()> {
            if let Some(suffix) = &self.archive_suffix {
                if url.ends_with(suffix.as_str()) {
                    write_ui_xaml_zip(dest);
                    return Ok(());
                }
            }
            std::fs::write(dest, b"downloaded")?;
            Ok(())
        }
    }

    struct FakeEngine {
        /// Signals to return, consumed in call order; empty = always Ok
        responses: RefCell<Vec<std::result::Result<(), RawSignal>>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeEngine {
        fn succeeding() -> Self {
            Self {
                responses: RefCell::new(Vec::new()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn scripted(responses: Vec<std::result::Result<(), RawSignal>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn next(&self) -> std::result::Result<(), RawSignal> {
            let mut responses = self.responses.borrow_mut();
            if responses.is_empty() {
                Ok(())
            } else {
                responses.remove(0)
            }
        }
    }

    impl PackageEngine for FakeEngine {
        fn add_package(&self, package: &PackageRef) -> std::result::Result<(), RawSignal> {
            self.calls.borrow_mut().push(package.as_argument());
            self.next()
        }

        fn provision_package(
            &self,
            package: &PackageRef,
            _license: Option<&Path>,
        ) -> std::result::Result<(), RawSignal> {
            self.calls
                .borrow_mut()
                .push(format!("provision {}", package.as_argument()));
            self.next()
        }
    }

    struct FakeStore {
        values: RefCell<HashMap<&'static str, String>>,
        writes: Cell<usize>,
    }

    impl FakeStore {
        fn empty() -> Self {
            let mut values = HashMap::new();
            values.insert("User", r"C:\Windows".to_string());
            values.insert("Machine", r"C:\Windows;C:\Windows\System32".to_string());
            Self {
                values: RefCell::new(values),
                writes: Cell::new(0),
            }
        }

        fn occurrences(&self, scope: &str, dir: &str) -> usize {
            self.values.borrow()[scope]
                .split(';')
                .filter(|segment| segment.eq_ignore_ascii_case(dir))
                .count()
        }
    }

    impl EnvPathStore for FakeStore {
        fn get(&self, scope: PathScope) -> Result<String> {
            Ok(self.values.borrow()[scope.as_str()].clone())
        }

        fn set(&self, scope: PathScope, value: &str) -> Result<()> {
            self.values
                .borrow_mut()
                .insert(scope.as_str(), value.to_string());
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_with_fallback_primary_success_skips_alternate() {
        let alternate_ran = Cell::new(false);
        let path = with_fallback(
            "dep",
            || Ok(()),
            || {
                alternate_ran.set(true);
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(path, SourcePath::Primary);
        assert!(!alternate_ran.get());
    }

    #[test]
    fn test_with_fallback_alternate_on_primary_failure() {
        let path = with_fallback(
            "dep",
            || {
                Err(WingstrapError::StoreLookupFailed {
                    identifier: "x".to_string(),
                    reason: "down".to_string(),
                })
            },
            || Ok(()),
        )
        .unwrap();
        assert_eq!(path, SourcePath::Alternate);
    }

    #[test]
    fn test_with_fallback_both_fail_propagates_alternate_error() {
        let err = with_fallback(
            "dep",
            || {
                Err(WingstrapError::StoreLookupFailed {
                    identifier: "x".to_string(),
                    reason: "down".to_string(),
                })
            },
            || {
                Err(WingstrapError::DownloadFailed {
                    url: "http://alt".to_string(),
                    reason: "timeout".to_string(),
                })
            },
        )
        .unwrap_err();
        assert!(matches!(err, WingstrapError::DownloadFailed { .. }));
    }

    #[test]
    fn test_happy_path_reaches_done() {
        let temp = TempDir::new().unwrap();
        let ctx = test_context(&temp);
        let provider = FakeProvider::with_store_entries();
        let engine = FakeEngine::succeeding();
        let store = FakeStore::empty();

        Orchestrator::new(&ctx, &provider, &engine, &store)
            .run()
            .unwrap();

        // Both dependencies came from the primary (store) source
        let calls = engine.calls.borrow();
        assert!(calls[0].contains("vclibs_x64"));
        assert!(calls[1].contains("uixaml_x64"));
        assert!(calls[2].starts_with("provision "));

        // The apps directory is on both scopes exactly once
        assert_eq!(store.occurrences("User", APPS), 1);
        assert_eq!(store.occurrences("Machine", APPS), 1);

        // All temp artifacts removed
        assert!(!ctx.temp_dir.exists());
    }

    #[test]
    fn test_ui_framework_alternate_archive_path() {
        let temp = TempDir::new().unwrap();
        let ctx = test_context(&temp);
        let mut provider = FakeProvider::with_store_entries();
        provider.store.remove("Microsoft.UI.Xaml.2.8_8wekyb3d8bbwe");
        provider.archive_suffix = Some("Microsoft.UI.Xaml/2.8.6".to_string());
        let engine = FakeEngine::succeeding();
        let store = FakeStore::empty();

        Orchestrator::new(&ctx, &provider, &engine, &store)
            .run()
            .unwrap();

        // The extracted architecture-specific package was installed locally
        let calls = engine.calls.borrow();
        assert!(
            calls
                .iter()
                .any(|c| c.contains("Microsoft.UI.Xaml.2.8.appx"))
        );

        // The extracted temp folder is gone after cleanup
        assert!(!ctx.temp_dir.exists());
    }

    #[test]
    fn test_runtime_lib_alternate_pinned_url() {
        let temp = TempDir::new().unwrap();
        let ctx = test_context(&temp);
        let mut provider = FakeProvider::with_store_entries();
        provider
            .store
            .remove("Microsoft.VCLibs.140.00.UWPDesktop_8wekyb3d8bbwe");
        let engine = FakeEngine::succeeding();
        let store = FakeStore::empty();

        Orchestrator::new(&ctx, &provider, &engine, &store)
            .run()
            .unwrap();

        let calls = engine.calls.borrow();
        assert_eq!(
            calls[0],
            "https://aka.ms/Microsoft.VCLibs.x64.14.00.Desktop.appx"
        );
    }

    #[test]
    fn test_same_version_signal_continues_run() {
        let temp = TempDir::new().unwrap();
        let ctx = test_context(&temp);
        let provider = FakeProvider::with_store_entries();
        let engine = FakeEngine::scripted(vec![
            Err(RawSignal::new(Some(SAME_VERSION_INSTALLED), "0x80073CFB")),
            Ok(()),
            Ok(()),
        ]);
        let store = FakeStore::empty();

        Orchestrator::new(&ctx, &provider, &engine, &store)
            .run()
            .unwrap();

        // All three install steps ran despite the benign first signal
        assert_eq!(engine.calls.borrow().len(), 3);
    }

    #[test]
    fn test_no_matching_asset_fails_before_path_mutation() {
        let temp = TempDir::new().unwrap();
        let ctx = test_context(&temp);
        let mut provider = FakeProvider::with_store_entries();
        provider.release = Some(winget_release(false));
        let engine = FakeEngine::succeeding();
        let store = FakeStore::empty();

        let failure = Orchestrator::new(&ctx, &provider, &engine, &store)
            .run()
            .unwrap_err();

        assert_eq!(failure.step, Step::InstallMainPackage);
        assert!(matches!(
            failure.error,
            WingstrapError::NoMatchingAsset { .. }
        ));
        // The Failed transition skips UpdatePath entirely
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn test_release_lookup_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let ctx = test_context(&temp);
        let mut provider = FakeProvider::with_store_entries();
        provider.release = None;
        let engine = FakeEngine::succeeding();
        let store = FakeStore::empty();

        let failure = Orchestrator::new(&ctx, &provider, &engine, &store)
            .run()
            .unwrap_err();
        assert_eq!(failure.step, Step::InstallMainPackage);
        assert!(matches!(
            failure.error,
            WingstrapError::ReleaseLookupFailed { .. }
        ));
    }
}
