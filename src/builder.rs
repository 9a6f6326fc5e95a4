//! Build orchestration: the fixed eight-step Chrome -> Firefox build

use crate::config::{BuildConfig, MissPolicy};
use crate::error::{BuildError, BuildResult};
use crate::models::{BuildReport, BuildStep, FirefoxManifest, SubstitutionRecord};
use crate::packager::{self, ScriptTreeTransformer};
use crate::parser::{parse_manifest_from_dir, MANIFEST_FILE_NAME};
use crate::transformer::manifest::{dropped_keys, validate_manifest};
use crate::transformer::{
    Adaptation, BackgroundAdapter, ContentAdapter, HtmlPatcher, ManifestSynthesizer,
    NamespaceRewriter,
};
use crate::validator;
use std::fs;
use std::path::{Path, PathBuf};

/// Receives progress as the build moves through its steps.
pub trait BuildProgress {
    fn step_started(&mut self, _step: BuildStep) {}
    fn item(&mut self, _step: BuildStep, _item: &str) {}
    fn step_finished(&mut self, _step: BuildStep) {}
}

/// Discards all progress.
pub struct SilentProgress;

impl BuildProgress for SilentProgress {}

pub struct Builder {
    source_root: PathBuf,
    output_root: PathBuf,
    config: BuildConfig,
    scripts: ScriptTreeTransformer,
    synthesizer: ManifestSynthesizer,
    background: BackgroundAdapter,
    content: ContentAdapter,
    html: HtmlPatcher,
}

impl Builder {
    pub fn new(source_root: impl Into<PathBuf>, config: BuildConfig) -> BuildResult<Self> {
        config.validate()?;
        let source_root = source_root.into();
        let output_root = config.output_dir(&source_root);
        config.check_output_root(&source_root, &output_root)?;

        let rewriter = NamespaceRewriter::new(&config.namespace.aliases)?;
        let scripts = ScriptTreeTransformer::new(
            rewriter,
            &config.paths.script_extension,
            config.passthrough_non_scripts,
        );

        Ok(Self {
            scripts,
            synthesizer: ManifestSynthesizer::new(&config),
            background: BackgroundAdapter::new(&config)?,
            content: ContentAdapter::new(&config)?,
            html: HtmlPatcher::new(&config.paths.shim_destination, &config.paths.script_dir)?,
            source_root,
            output_root,
            config,
        })
    }

    /// Override the configured output directory.
    pub fn with_output(mut self, output_root: impl Into<PathBuf>) -> BuildResult<Self> {
        let output_root = output_root.into();
        self.config.check_output_root(&self.source_root, &output_root)?;
        self.output_root = output_root;
        Ok(self)
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn build(&self) -> BuildResult<BuildReport> {
        self.build_with(&mut SilentProgress)
    }

    /// Run every step in order. The first fatal error stops the build.
    pub fn build_with(&self, progress: &mut dyn BuildProgress) -> BuildResult<BuildReport> {
        let mut report = BuildReport {
            output_dir: self.output_root.clone(),
            ..BuildReport::default()
        };
        let mut manifest = None;

        for step in BuildStep::ALL {
            tracing::info!(step = %step, "{}", step.description());
            progress.step_started(step);

            match step {
                BuildStep::Clean => {
                    packager::clean_output(&self.source_root, &self.output_root)?
                }
                BuildStep::MirrorAssets => self.mirror_assets(&mut report, progress)?,
                BuildStep::TransformScripts => self.transform_scripts(&mut report, progress)?,
                BuildStep::InstallShim => {
                    packager::install_shim(
                        &self.source_root,
                        &self.output_root,
                        &self.config.paths.shim_source,
                        &self.config.paths.shim_destination,
                    )?;
                    progress.item(step, &self.config.paths.shim_destination);
                }
                BuildStep::SynthesizeManifest => {
                    manifest = Some(self.write_manifest(&mut report)?);
                    progress.item(step, MANIFEST_FILE_NAME);
                }
                BuildStep::AdaptBackground => {
                    let path = &self.config.paths.background_script;
                    let adapt = |text: &str| self.background.adapt(text);
                    self.adapt_script(step, path, adapt, &mut report)?;
                    progress.item(step, path);
                }
                BuildStep::AdaptContent => {
                    let path = &self.config.paths.content_script;
                    let adapt = |text: &str| self.content.adapt(text);
                    self.adapt_script(step, path, adapt, &mut report)?;
                    progress.item(step, path);
                }
                BuildStep::PatchMarkup => self.patch_markup(&mut report, progress)?,
            }

            report.completed_steps.push(step);
            progress.step_finished(step);
        }

        if let Some(manifest) = &manifest {
            for warning in validator::validate_output(&self.output_root, manifest, &self.config) {
                tracing::warn!("{warning}");
                report.add_warning(warning);
            }
        }

        Ok(report)
    }

    /// Synthesize the Firefox manifest without touching the output tree.
    pub fn synthesize_manifest(&self) -> BuildResult<FirefoxManifest> {
        let source = parse_manifest_from_dir(&self.source_root)?;
        let manifest = self.synthesizer.synthesize(source);
        validate_manifest(&manifest)?;
        Ok(manifest)
    }

    fn mirror_assets(
        &self,
        report: &mut BuildReport,
        progress: &mut dyn BuildProgress,
    ) -> BuildResult<()> {
        for asset in &self.config.paths.static_assets {
            let copied = packager::mirror_path(&self.source_root, &self.output_root, asset)?;
            report.assets_mirrored.extend(copied);
            progress.item(BuildStep::MirrorAssets, asset);
        }
        Ok(())
    }

    fn transform_scripts(
        &self,
        report: &mut BuildReport,
        progress: &mut dyn BuildProgress,
    ) -> BuildResult<()> {
        for script_path in &self.config.paths.script_paths {
            let outcome = self
                .scripts
                .transform(&self.source_root, &self.output_root, script_path)?;

            report.api_aliases_rewritten += outcome.aliases_rewritten;
            report.scripts_transformed.extend(outcome.transformed);
            report.files_passed_through.extend(outcome.passed_through);
            for skipped in outcome.skipped {
                report.add_warning(format!(
                    "{} is not a script and was not copied",
                    skipped.display()
                ));
            }
            progress.item(BuildStep::TransformScripts, script_path);
        }
        Ok(())
    }

    fn write_manifest(&self, report: &mut BuildReport) -> BuildResult<FirefoxManifest> {
        let step = BuildStep::SynthesizeManifest;
        let source = parse_manifest_from_dir(&self.source_root)?;
        report.extension_name = source.name.clone().unwrap_or_default();
        report.extension_version = source.version.clone().unwrap_or_default();
        report.dropped_manifest_keys = dropped_keys(&source);

        let manifest = self.synthesizer.synthesize(source);
        validate_manifest(&manifest)?;

        let path = self.output_root.join(MANIFEST_FILE_NAME);
        let json =
            serde_json::to_string_pretty(&manifest).map_err(|source| BuildError::Serialize {
                step,
                path: path.clone(),
                source,
            })?;
        packager::write_file(step, &path, &json)?;

        Ok(manifest)
    }

    fn adapt_script<F>(
        &self,
        step: BuildStep,
        relative: &str,
        adapt: F,
        report: &mut BuildReport,
    ) -> BuildResult<()>
    where
        F: Fn(&str) -> Adaptation,
    {
        let src = self.source_root.join(relative);
        if !src.is_file() {
            return Err(BuildError::missing(step, src));
        }
        let text = fs::read_to_string(&src).map_err(|e| BuildError::io(step, &src, e))?;

        let adaptation = adapt(&text);
        report.api_aliases_rewritten += adaptation.aliases_rewritten;
        self.settle_rules(step, relative, &adaptation, report)?;

        packager::write_file(step, &self.output_root.join(relative), &adaptation.text)
    }

    /// Record rule outcomes; a miss is fatal or a warning depending on policy.
    fn settle_rules(
        &self,
        step: BuildStep,
        relative: &str,
        adaptation: &Adaptation,
        report: &mut BuildReport,
    ) -> BuildResult<()> {
        for rule in &adaptation.applied {
            report.substitutions.push(SubstitutionRecord {
                file: PathBuf::from(relative),
                rule: rule.clone(),
                applied: true,
            });
        }

        for rule in &adaptation.missed {
            match self.config.on_pattern_miss {
                MissPolicy::Fail => {
                    return Err(BuildError::PatternMiss {
                        step,
                        path: self.source_root.join(relative),
                        rule: rule.clone(),
                    });
                }
                MissPolicy::Warn => {
                    tracing::warn!(
                        step = %step,
                        file = relative,
                        rule = %rule,
                        "rewrite rule did not match"
                    );
                    report.add_warning(format!(
                        "{relative}: rule '{rule}' did not match, file written without it"
                    ));
                    report.substitutions.push(SubstitutionRecord {
                        file: PathBuf::from(relative),
                        rule: rule.clone(),
                        applied: false,
                    });
                }
            }
        }

        Ok(())
    }

    fn patch_markup(
        &self,
        report: &mut BuildReport,
        progress: &mut dyn BuildProgress,
    ) -> BuildResult<()> {
        for page in &self.config.paths.markup_entry_points {
            if self.html.patch_file(&self.output_root.join(page))? {
                report.markup_patched.push(PathBuf::from(page));
            }
            progress.item(BuildStep::PatchMarkup, page);
        }
        Ok(())
    }
}
