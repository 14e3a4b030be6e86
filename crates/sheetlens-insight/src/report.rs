//! Natural-language structure report

use crate::patterns::{has_pattern, sheet_has_pattern};
use crate::score::{run_category_counts, run_tag_counts};
use sheetlens_formula::families;
use sheetlens_graph::SheetGraph;
use sheetlens_model::{
    AnalysisResult, BusinessLogicFinding, ComplexityAssessment, ComplexityLevel, DependencyEdge,
    DependencyKind, PatternKind, PatternMatch, RelationshipDescription, SheetDescription,
    SheetSnapshot, StructureReport,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Heavy-formula count above which a performance recommendation is made
pub const HEAVY_FORMULA_MIN: usize = 10;

/// Run score above which conversion to script is recommended
pub const SCRIPT_RECOMMEND_MIN_SCORE: u8 = 60;

/// Everything the report is built from
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    /// Harvested sheets
    pub sheets: &'a [SheetSnapshot],
    /// Dependency edges
    pub edges: &'a [DependencyEdge],
    /// Graph over the edges
    pub graph: &'a SheetGraph<'a>,
    /// Detected patterns
    pub patterns: &'a [PatternMatch],
    /// Logic findings
    pub findings: &'a [BusinessLogicFinding],
    /// Run complexity score
    pub complexity: u8,
}

fn quoted_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<_> = names.into_iter().collect();
    format!("'{}'", names.join("', '"))
}

/// One-sentence summary
#[must_use]
pub fn overview(sheets: &[SheetSnapshot]) -> String {
    let formulas: usize = sheets.iter().map(SheetSnapshot::formula_count).sum();
    format!(
        "이 스프레드시트는 총 {}개의 시트로 구성되어 있으며, {formulas}개의 수식을 포함하고 있습니다.",
        sheets.len()
    )
}

/// Purpose by first matching pattern
#[must_use]
pub fn purpose(patterns: &[PatternMatch]) -> &'static str {
    if has_pattern(patterns, PatternKind::AggregationSheet) {
        "데이터를 집계하고 분석하는 용도로 사용되고 있습니다."
    } else if has_pattern(patterns, PatternKind::CalculationSheet) {
        "복잡한 계산과 데이터 처리를 수행하는 용도입니다."
    } else if has_pattern(patterns, PatternKind::LookupSheet) {
        "여러 소스에서 데이터를 조회하고 통합하는 용도입니다."
    } else {
        "다양한 데이터를 관리하고 처리하는 종합 워크시트입니다."
    }
}

/// Sentence used when no sheet references another
pub const INDEPENDENT_FLOW: &str = "각 시트가 독립적으로 작동하며, 시트 간 참조가 없습니다.";

/// How data moves between sheets
#[must_use]
pub fn data_flow(edges: &[DependencyEdge], graph: &SheetGraph<'_>, patterns: &[PatternMatch]) -> String {
    if edges.is_empty() {
        return INDEPENDENT_FLOW.to_string();
    }

    let mut sentences = Vec::new();
    let tagged = |kind: PatternKind| {
        patterns
            .iter()
            .find(|p| p.pattern_name == kind)
            .filter(|p| !p.sheet_names.is_empty())
    };
    if let Some(master) = tagged(PatternKind::MasterData) {
        sentences.push(format!(
            "{} 시트가 마스터 데이터 역할을 하며, 다른 시트들이 이를 참조합니다.",
            quoted_list(master.sheet_names.iter().map(String::as_str))
        ));
    }
    if let Some(lookup) = tagged(PatternKind::LookupSheet) {
        sentences.push(format!(
            "{} 시트에서 데이터 조회가 이루어집니다.",
            quoted_list(lookup.sheet_names.iter().map(String::as_str))
        ));
    }

    let sources = graph.data_sources();
    let sinks = graph.data_sinks();
    if !sources.is_empty() && !sinks.is_empty() {
        sentences.push(format!(
            "데이터는 {} 시트에서 시작하여 {} 시트로 모입니다.",
            quoted_list(sources),
            quoted_list(sinks)
        ));
    }
    for group in graph.circular_groups() {
        sentences.push(format!("{} 시트 사이에 순환 참조가 있습니다.", quoted_list(group)));
    }

    sentences.join(" ")
}

/// Role of one sheet by pattern precedence
#[must_use]
pub fn sheet_role(sheet: &SheetSnapshot, patterns: &[PatternMatch]) -> &'static str {
    let roles = [
        (PatternKind::MasterData, "마스터 데이터 저장소"),
        (PatternKind::CalculationSheet, "데이터 계산 및 처리"),
        (PatternKind::AggregationSheet, "데이터 집계 및 요약"),
        (PatternKind::LookupSheet, "데이터 조회 및 검색"),
    ];
    for (kind, role) in roles {
        if sheet_has_pattern(patterns, &sheet.name, kind) {
            return role;
        }
    }
    if sheet.formula_count() == 0 {
        "데이터 입력 및 저장"
    } else {
        "데이터 처리"
    }
}

/// Size, formula count and most frequent tags
#[must_use]
pub fn key_features(sheet: &SheetSnapshot) -> Vec<String> {
    let mut features = vec![format!("{}행 × {}열", sheet.row_count, sheet.column_count)];
    if sheet.formula_count() > 0 {
        features.push(format!("{}개 수식", sheet.formula_count()));
    } else {
        features.push("수식 없음 (데이터 시트)".to_string());
    }
    let top = sheet.top_tags(3);
    if !top.is_empty() {
        features.push(format!("주요 수식: {}", top.join(", ")));
    }
    if sheet.sampled {
        features.push("일부 영역만 분석됨 (샘플링)".to_string());
    }
    features
}

/// Bucket for a run score
#[must_use]
pub fn complexity_level(score: u8) -> ComplexityLevel {
    match score {
        0..=19 => ComplexityLevel::Simple,
        20..=49 => ComplexityLevel::Moderate,
        50..=79 => ComplexityLevel::Complex,
        _ => ComplexityLevel::VeryComplex,
    }
}

fn assess_complexity(inputs: &ReportInputs<'_>, distinct_tags: usize) -> ComplexityAssessment {
    let level = complexity_level(inputs.complexity);
    let mut reasons = vec![match level {
        ComplexityLevel::Simple => "수식의 개수가 적고 구조가 단순합니다",
        ComplexityLevel::Moderate => "적당한 수의 수식과 시트 간 참조가 있습니다",
        ComplexityLevel::Complex => "많은 수식과 복잡한 시트 간 관계가 있습니다",
        ComplexityLevel::VeryComplex => "매우 많은 수식과 복잡한 의존성 구조를 가지고 있습니다",
    }
    .to_string()];

    if inputs.edges.len() > 5 {
        reasons.push(format!("{}개의 시트 간 참조가 있습니다", inputs.edges.len()));
    }
    if distinct_tags > 10 {
        reasons.push(format!("{distinct_tags}가지 종류의 수식을 사용합니다"));
    }
    let cycles = inputs.graph.circular_groups().len();
    if cycles > 0 {
        reasons.push(format!("순환 참조 그룹이 {cycles}개 있습니다"));
    }

    ComplexityAssessment { level, reasons }
}

fn recommendations(inputs: &ReportInputs<'_>, tag_counts: &BTreeMap<String, usize>) -> Vec<String> {
    let mut out = Vec::new();
    if inputs.complexity > SCRIPT_RECOMMEND_MIN_SCORE {
        out.push("복잡도가 높습니다. Apps Script로 변환하면 유지보수가 더 쉬워집니다.");
    }
    if inputs.edges.len() > 5 {
        out.push("시트 간 참조가 많습니다. 모듈화된 함수로 구조를 개선할 수 있습니다.");
    }
    let heavy = families::HEAVY
        .iter()
        .any(|tag| tag_counts.get(*tag).copied().unwrap_or(0) > HEAVY_FORMULA_MIN);
    if heavy {
        out.push("성능이 느린 수식이 많습니다. Apps Script로 최적화하면 속도가 개선됩니다.");
    }
    if inputs.findings.len() > 5 {
        out.push("복잡한 비즈니스 로직이 있습니다. 코드로 변환하면 로직을 명확하게 문서화할 수 있습니다.");
    }
    if inputs.graph.has_cycles() {
        out.push("시트 간 순환 참조가 있습니다. 참조 방향을 한쪽으로 정리하면 계산 오류를 줄일 수 있습니다.");
    }
    if out.is_empty() {
        out.push("전체적으로 잘 구조화되어 있습니다.");
    }
    out.into_iter().map(str::to_string).collect()
}

/// Sentence describing one edge
#[must_use]
pub fn describe_relationship(edge: &DependencyEdge) -> RelationshipDescription {
    let (from, to) = (&edge.from_sheet, &edge.to_sheet);
    let description = match edge.kind {
        DependencyKind::Lookup => format!("'{from}' 시트에서 '{to}' 시트의 데이터를 검색합니다"),
        DependencyKind::FormulaDependency => {
            format!("'{from}' 시트의 수식이 '{to}' 시트에 의존합니다")
        }
        DependencyKind::DataReference => format!("'{from}' 시트에서 '{to}' 시트를 참조합니다"),
    };
    RelationshipDescription {
        from: from.clone(),
        to: to.clone(),
        kind: edge.kind,
        description,
    }
}

/// Assemble the full report
#[must_use]
pub fn build_report(inputs: &ReportInputs<'_>) -> StructureReport {
    let tag_counts = run_tag_counts(inputs.sheets);
    StructureReport {
        overview: overview(inputs.sheets),
        purpose: purpose(inputs.patterns).to_string(),
        data_flow: data_flow(inputs.edges, inputs.graph, inputs.patterns),
        sheet_descriptions: inputs
            .sheets
            .iter()
            .map(|sheet| SheetDescription {
                sheet_name: sheet.name.clone(),
                role: sheet_role(sheet, inputs.patterns).to_string(),
                key_features: key_features(sheet),
            })
            .collect(),
        complexity: assess_complexity(inputs, tag_counts.len()),
        recommendations: recommendations(inputs, &tag_counts),
        relationships: inputs.edges.iter().map(describe_relationship).collect(),
        formula_categories: run_category_counts(inputs.sheets),
    }
}

/// Plain-text rendering for terminals
#[must_use]
pub fn render_text(result: &AnalysisResult) -> String {
    let report = &result.report;
    let intent = &result.intent;
    let mut out = String::new();

    let _ = writeln!(out, "# {} ({})", result.title, result.spreadsheet_id);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.overview);
    let _ = writeln!(out, "{}", report.purpose);
    if result.used_sampling {
        let _ = writeln!(out, "(일부 시트는 샘플링되어 분석되었습니다)");
    }
    if result.harvest_stats.failed_batches > 0 {
        let _ = writeln!(
            out,
            "(요청 {}개 중 {}개를 가져오지 못했습니다)",
            result.harvest_stats.total_batches, result.harvest_stats.failed_batches
        );
    }

    let _ = writeln!(out, "\n## 복잡도: {} / 100", result.complexity_score);
    for reason in &report.complexity.reasons {
        let _ = writeln!(out, "- {reason}");
    }

    let _ = writeln!(out, "\n## 제작자 의도");
    let _ = writeln!(out, "목표: {}", intent.main_goal);
    let _ = writeln!(out, "맥락: {}", intent.business_context);
    let _ = writeln!(out, "설계: {}", intent.workflow_narrative);
    for point in &intent.pain_points {
        let _ = writeln!(out, "- {point}");
    }

    let _ = writeln!(out, "\n## 데이터 흐름");
    let _ = writeln!(out, "{}", report.data_flow);
    for rel in &report.relationships {
        let _ = writeln!(out, "- {}", rel.description);
    }

    let _ = writeln!(out, "\n## 시트");
    for desc in &report.sheet_descriptions {
        let _ = writeln!(
            out,
            "- {}: {} ({})",
            desc.sheet_name,
            desc.role,
            desc.key_features.join(", ")
        );
    }

    if !result.logic_findings.is_empty() {
        let _ = writeln!(out, "\n## 비즈니스 로직");
        for finding in &result.logic_findings {
            let _ = writeln!(out, "- [{}] {}", finding.sheet_name, finding.rationale);
        }
    }

    let _ = writeln!(out, "\n## 개선 제안");
    for rec in &report.recommendations {
        let _ = writeln!(out, "- {rec}");
    }

    let _ = writeln!(out, "\n## 다이어그램\n{}", result.diagram.mermaid);
    out
}
