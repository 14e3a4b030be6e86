//! Analysis pipeline
//!
//! One run goes: cache check, metadata, harvest, edge building, insight
//! synthesis, cache write. Only the cache check and the metadata call can
//! end a run early; everything after the metadata call always completes.

use crate::cache::{MokaResultCache, NoopCache, ResultCache};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, ConfigError};
use crate::locator::SpreadsheetLocator;
use crate::offline::reclassify;
use chrono::Utc;
use sheetlens_graph::build_edges;
use sheetlens_harvest::{HarvestSettings, Harvester, SheetSource};
use sheetlens_insight::synthesize;
use sheetlens_model::{AnalysisResult, HarvestStats, SheetSnapshot, SpreadsheetId};
use std::sync::Arc;

/// Runs stages two to six over harvested sheets
///
/// `known` lists every sheet in the source; edges to other names are dropped.
pub(crate) fn assemble(
    id: SpreadsheetId,
    title: String,
    sheets: Vec<SheetSnapshot>,
    known: &[&str],
    harvest_stats: HarvestStats,
) -> AnalysisResult {
    let used_sampling = sheets.iter().any(|s| s.sampled);
    let edges = build_edges(&sheets, known.iter().copied());
    let insights = synthesize(&sheets, &edges, known);

    tracing::info!(
        spreadsheet = %id,
        sheets = sheets.len(),
        edges = edges.len(),
        patterns = insights.patterns.len(),
        complexity = insights.complexity_score,
        "analysis assembled"
    );

    AnalysisResult {
        spreadsheet_id: id,
        title,
        sheets,
        edges,
        patterns: insights.patterns,
        logic_findings: insights.logic_findings,
        intent: insights.intent,
        complexity_score: insights.complexity_score,
        diagram: insights.diagram,
        used_sampling,
        report: insights.report,
        harvest_stats,
        analyzed_at: Utc::now(),
    }
}

/// Analyze already-harvested sheets without a source
///
/// Derived formula fields are rebuilt from the formula text first.
#[must_use]
pub fn analyze_snapshots(
    id: SpreadsheetId,
    title: impl Into<String>,
    sheets: Vec<SheetSnapshot>,
) -> AnalysisResult {
    let sheets: Vec<SheetSnapshot> = sheets.into_iter().map(reclassify).collect();
    let names: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();
    let known: Vec<&str> = names.iter().map(String::as_str).collect();
    assemble(id, title.into(), sheets, &known, HarvestStats::default())
}

/// Spreadsheet analyzer bound to a source and a result cache
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn SheetSource>,
    harvester: Harvester,
    cache: Arc<dyn ResultCache>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("harvester", &self.harvester)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Create analyzer over a source, without caching
    #[must_use]
    pub fn new(source: Arc<dyn SheetSource>, settings: HarvestSettings) -> Self {
        Self {
            harvester: Harvester::new(Arc::clone(&source), settings),
            source,
            cache: Arc::new(NoopCache),
        }
    }

    /// With result cache
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Analyzer against the live source described by `config`
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` from [`AnalyzerConfig::validate`]
    /// - `ConfigError::MissingCredentials` when no credential is set
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source: Arc<dyn SheetSource> = Arc::new(config.sheet_source()?);
        let cache: Arc<dyn ResultCache> = if config.cache.enabled {
            Arc::new(MokaResultCache::from_config(&config.cache))
        } else {
            Arc::new(NoopCache)
        };
        Ok(Self::new(source, config.harvest_settings()).with_cache(cache))
    }

    /// Harvest settings in use
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &HarvestSettings {
        self.harvester.settings()
    }

    /// Analyze the spreadsheet named by a URL or bare id
    ///
    /// # Errors
    /// - `AnalysisError::Configuration` for an unrecognized locator
    /// - Any error of [`Self::analyze`]
    pub async fn analyze_locator(&self, locator: &str) -> Result<Arc<AnalysisResult>, AnalysisError> {
        let locator = SpreadsheetLocator::parse(locator)?;
        self.analyze(locator.id()).await
    }

    /// Analyze one spreadsheet
    ///
    /// A cached result for `id` is returned as is. Batch failures during the
    /// harvest are absorbed; the result then undercounts those regions.
    ///
    /// # Errors
    /// - `AnalysisError::Unauthorized` / `AccessDenied` when the source
    ///   rejects the metadata request
    /// - `AnalysisError::Processing` for any other metadata failure
    pub async fn analyze(&self, id: &SpreadsheetId) -> Result<Arc<AnalysisResult>, AnalysisError> {
        if let Some(cached) = self.cache.get(id).await {
            tracing::info!(spreadsheet = %id, "serving cached analysis");
            return Ok(cached);
        }

        tracing::info!(spreadsheet = %id, "analysis started");
        let metadata = self.source.metadata(id).await.map_err(|err| {
            tracing::error!(spreadsheet = %id, error = %err, "metadata fetch failed");
            AnalysisError::from(err)
        })?;
        tracing::debug!(
            title = %metadata.title,
            sheets = metadata.sheets.len(),
            "metadata fetched"
        );

        let harvest = self.harvester.harvest(id, &metadata.sheets).await;
        if harvest.failed_batches > 0 {
            tracing::warn!(
                spreadsheet = %id,
                failed = harvest.failed_batches,
                total = harvest.total_batches,
                "some batches failed, result undercounts"
            );
        }

        let stats = HarvestStats {
            total_batches: harvest.total_batches,
            failed_batches: harvest.failed_batches,
        };
        let known = metadata.sheet_names();
        let result = Arc::new(assemble(
            id.clone(),
            metadata.title.clone(),
            harvest.sheets,
            &known,
            stats,
        ));

        self.cache.insert(id.clone(), Arc::clone(&result)).await;
        tracing::info!(spreadsheet = %id, "analysis complete");
        Ok(result)
    }
}
