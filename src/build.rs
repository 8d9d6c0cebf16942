//! The render & symlink engine.
//!
//! Config-file and config-directory executors funnel through here: template
//! sources are rendered into a transient build directory that is fully
//! cleared at the start of each pass, then destinations are linked to the
//! rendered output. Re-running with no external changes reaches
//! byte-identical build output and identical link targets.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::error::EngineError;
use crate::fsutil;
use crate::platform::Platform;
use crate::template::{self, Vars};

/// Subdirectory of the config root holding template sources.
pub const TEMPLATES_DIR: &str = "templates";
/// Transient build directory, exclusively owned by the engine during a pass.
pub const BUILD_DIR: &str = ".build";
/// Subdirectory of the config root exposed to templates as `{{modules}}`.
pub const MODULES_DIR: &str = "modules";

/// One planned render: where the template lives, where its rendered copy
/// goes, and where the destination link points.
#[derive(Debug)]
struct BuildTarget {
    template: PathBuf,
    rendered: PathBuf,
    destination: PathBuf,
}

/// Installs an artifact at a destination path.
///
/// Symlinks are the native mechanism; platforms without dependable symlink
/// semantics fall back to copying the rendered output into place.
pub trait LinkStrategy {
    /// Install `source` at `destination`. The destination's parent exists
    /// and the destination itself has been cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the link or copy fails.
    fn install(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// Symlink the destination to the rendered file.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymlinkStrategy;

impl LinkStrategy for SymlinkStrategy {
    fn install(&self, source: &Path, destination: &Path) -> Result<()> {
        #[cfg(unix)]
        std::os::unix::fs::symlink(source, destination).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                destination.display(),
                source.display()
            )
        })?;

        #[cfg(windows)]
        {
            let result = if source.is_dir() {
                std::os::windows::fs::symlink_dir(source, destination)
            } else {
                std::os::windows::fs::symlink_file(source, destination)
            };
            result.with_context(|| {
                format!(
                    "creating symlink {} -> {}",
                    destination.display(),
                    source.display()
                )
            })?;
        }

        Ok(())
    }
}

/// Copy the rendered output into place.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyStrategy;

impl LinkStrategy for CopyStrategy {
    fn install(&self, source: &Path, destination: &Path) -> Result<()> {
        if source.is_dir() {
            fsutil::copy_dir_recursive(source, destination)
        } else {
            std::fs::copy(source, destination)
                .map(|_| ())
                .with_context(|| format!("copying to {}", destination.display()))
        }
    }
}

/// The render & symlink engine for one sync pass.
pub struct BuildEngine {
    templates_dir: PathBuf,
    build_dir: PathBuf,
    home: PathBuf,
    vars: Vars,
    force: bool,
    strategy: Box<dyn LinkStrategy>,
}

impl BuildEngine {
    /// Create an engine rooted at the config repository, choosing the link
    /// strategy for `platform`.
    #[must_use]
    pub fn new(root: &Path, target: &str, home: &Path, platform: Platform, force: bool) -> Self {
        let strategy: Box<dyn LinkStrategy> = if platform.is_windows() {
            Box::new(CopyStrategy)
        } else {
            Box::new(SymlinkStrategy)
        };
        Self::with_strategy(root, target, home, force, strategy)
    }

    /// Create an engine with an explicit link strategy.
    #[must_use]
    pub fn with_strategy(
        root: &Path,
        target: &str,
        home: &Path,
        force: bool,
        strategy: Box<dyn LinkStrategy>,
    ) -> Self {
        let vars = Vars {
            target: target.to_string(),
            home: home.to_string_lossy().into_owned(),
            modules: root.join(MODULES_DIR).to_string_lossy().into_owned(),
        };
        Self {
            templates_dir: root.join(TEMPLATES_DIR),
            build_dir: root.join(BUILD_DIR),
            home: home.to_path_buf(),
            vars,
            force,
            strategy,
        }
    }

    /// The transient build directory.
    #[must_use]
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Clear the build directory for a fresh pass so stale output never
    /// accumulates across runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed or recreated.
    pub fn begin_pass(&self) -> Result<()> {
        if self.build_dir.exists() {
            std::fs::remove_dir_all(&self.build_dir)
                .with_context(|| format!("clear build dir {}", self.build_dir.display()))?;
        }
        std::fs::create_dir_all(&self.build_dir)
            .with_context(|| format!("create build dir {}", self.build_dir.display()))?;
        Ok(())
    }

    /// Render one template and link the destination to the rendered file.
    ///
    /// # Errors
    ///
    /// Returns an error on template failures, I/O failures, or an unmanaged
    /// destination without force.
    pub fn install_file(&self, source: &str, destination: &str) -> Result<()> {
        let target = self.plan(source, destination);
        self.render_one(&target.template, &target.rendered)
            .with_context(|| format!("render {source}"))?;
        self.link(&target.rendered, &target.destination)
    }

    /// Render every file under a template directory and link the
    /// destination to the rendered tree.
    ///
    /// # Errors
    ///
    /// Returns an error on template failures, I/O failures, or an unmanaged
    /// destination without force.
    pub fn install_dir(&self, source: &str, destination: &str) -> Result<()> {
        let target = self.plan(source, destination);
        self.render_tree(&target.template, &target.rendered)
            .with_context(|| format!("render {source}"))?;
        self.link(&target.rendered, &target.destination)
    }

    fn plan(&self, source: &str, destination: &str) -> BuildTarget {
        BuildTarget {
            template: self.templates_dir.join(source),
            rendered: self.build_dir.join(source),
            destination: fsutil::expand_tilde(destination, &self.home),
        }
    }

    fn render_one(&self, template_path: &Path, rendered_path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(template_path)
            .with_context(|| format!("read template {}", template_path.display()))?;
        let rendered = template::render(&text, &self.vars)?;
        fsutil::ensure_parent_dir(rendered_path)?;
        std::fs::write(rendered_path, rendered)
            .with_context(|| format!("write {}", rendered_path.display()))?;
        Ok(())
    }

    fn render_tree(&self, template_root: &Path, rendered_root: &Path) -> Result<()> {
        for entry in walkdir::WalkDir::new(template_root) {
            let entry =
                entry.with_context(|| format!("walk {}", template_root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(template_root)
                .with_context(|| format!("relativise {}", entry.path().display()))?;
            self.render_one(entry.path(), &rendered_root.join(relative))?;
        }
        Ok(())
    }

    /// Point `destination` at `rendered`, clearing whatever is in the way.
    ///
    /// Symlinks at the destination are always replaced; an unmanaged
    /// regular file or directory is left untouched and reported as a
    /// conflict unless force is set.
    fn link(&self, rendered: &Path, destination: &Path) -> Result<()> {
        fsutil::ensure_parent_dir(destination)?;

        if let Ok(metadata) = destination.symlink_metadata() {
            if metadata.is_symlink() {
                std::fs::remove_file(destination)
                    .with_context(|| format!("remove existing link: {}", destination.display()))?;
            } else if !self.force {
                return Err(EngineError::Conflict(destination.to_path_buf()).into());
            } else if metadata.is_dir() {
                std::fs::remove_dir_all(destination)
                    .with_context(|| format!("remove existing dir: {}", destination.display()))?;
            } else {
                std::fs::remove_file(destination)
                    .with_context(|| format!("remove existing file: {}", destination.display()))?;
            }
        }

        self.strategy.install(rendered, destination)?;
        tracing::debug!("linked {} -> {}", destination.display(), rendered.display());
        Ok(())
    }
}
