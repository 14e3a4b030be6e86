//! Creator-intent inference
//!
//! Template choice is a pure function of [`IntentSignals`]; text assembly is
//! separate so the branching can be tested on its own.

use crate::logic::has_logic;
use crate::patterns::has_pattern;
use sheetlens_model::{BusinessLogicFinding, IntentInference, LogicKind, PatternKind, PatternMatch};

/// Run score above which a calculation workbook reads as process automation
pub const AUTOMATION_MIN_SCORE: u8 = 50;

/// Edge count above which a lookup workbook reads as distributed lookup
pub const DISTRIBUTED_LOOKUP_MIN_EDGES: usize = 3;

/// Edge count above which the workbook reads as one integrated system
pub const INTEGRATED_MIN_EDGES: usize = 5;

/// Sheet count above which the workbook reads as modular
pub const MODULAR_MIN_SHEETS: usize = 5;

/// Boolean and numeric signals the template choice depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntentSignals {
    /// Any master-data sheet
    pub master: bool,
    /// Any lookup sheet
    pub lookup: bool,
    /// Any aggregation sheet
    pub aggregation: bool,
    /// Any calculation sheet
    pub calculation: bool,
    /// Run complexity score
    pub complexity: u8,
    /// Number of dependency edges
    pub edge_count: usize,
    /// Number of sheets
    pub sheet_count: usize,
}

impl IntentSignals {
    /// Derive signals from detected patterns
    #[must_use]
    pub fn from_patterns(
        patterns: &[PatternMatch],
        complexity: u8,
        edge_count: usize,
        sheet_count: usize,
    ) -> Self {
        Self {
            master: has_pattern(patterns, PatternKind::MasterData),
            lookup: has_pattern(patterns, PatternKind::LookupSheet),
            aggregation: has_pattern(patterns, PatternKind::AggregationSheet),
            calculation: has_pattern(patterns, PatternKind::CalculationSheet),
            complexity,
            edge_count,
            sheet_count,
        }
    }
}

/// Fixed text of one narrative template
#[derive(Debug, Clone, Copy)]
pub struct TemplateText {
    /// Primary goal
    pub main_goal: &'static str,
    /// Likely business setting
    pub business_context: &'static str,
    /// Initial workflow narrative
    pub workflow: &'static str,
    /// Seed pain points
    pub pain_points: &'static [&'static str],
}

/// Narrative template, in selection precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentTemplate {
    /// Master data, lookups and aggregation together
    IntegratedAnalytics,
    /// Dense calculations in a complex workbook
    ProcessAutomation,
    /// Lookups spread over many references
    DistributedLookup,
    /// Aggregation without a master source
    Summarization,
    /// Nothing more specific applies
    GeneralManagement,
}

impl IntentTemplate {
    /// Select the first template whose condition holds
    #[must_use]
    pub fn select(signals: &IntentSignals) -> Self {
        if signals.master && signals.lookup && signals.aggregation {
            Self::IntegratedAnalytics
        } else if signals.calculation && signals.complexity > AUTOMATION_MIN_SCORE {
            Self::ProcessAutomation
        } else if signals.lookup && signals.edge_count > DISTRIBUTED_LOOKUP_MIN_EDGES {
            Self::DistributedLookup
        } else if signals.aggregation && !signals.master {
            Self::Summarization
        } else {
            Self::GeneralManagement
        }
    }

    /// Template text
    #[must_use]
    pub fn text(self) -> TemplateText {
        match self {
            Self::IntegratedAnalytics => TemplateText {
                main_goal: "여러 데이터 소스를 통합하고 분석하여 인사이트를 도출하려는 목표",
                business_context: "분산된 데이터를 중앙화하고, 실시간으로 집계 분석이 필요한 업무 환경으로 보입니다. 아마도 정기적인 보고서 작성이나 의사결정을 위한 데이터 분석이 주 목적일 것입니다.",
                workflow: "마스터 데이터 → 조회/참조 → 집계/분석 순서로 데이터가 흐르도록 설계했습니다. 이는 데이터 무결성을 유지하면서도 다양한 관점에서 분석할 수 있도록 한 체계적인 접근입니다.",
                pain_points: &[
                    "수동으로 데이터를 여러 곳에서 복사하는 번거로움",
                    "데이터가 변경될 때마다 여러 시트를 업데이트해야 하는 불편함",
                    "집계 결과의 정확성을 보장하기 어려운 문제",
                ],
            },
            Self::ProcessAutomation => TemplateText {
                main_goal: "복잡한 비즈니스 로직을 자동화하여 반복 작업을 줄이려는 목표",
                business_context: "정형화된 프로세스가 있지만 매번 수동으로 계산하기에는 시간이 많이 걸리는 업무로 보입니다. 아마도 견적서 작성, 급여 계산, 재고 관리 등의 업무일 가능성이 높습니다.",
                workflow: "입력 데이터를 받아 정해진 규칙에 따라 자동으로 계산하고 결과를 산출하는 워크플로우를 구축했습니다. 조건부 로직을 많이 사용한 것으로 보아 다양한 케이스를 처리하려는 의도가 보입니다.",
                pain_points: &[
                    "같은 계산을 반복적으로 수행하는 시간 낭비",
                    "수동 계산 시 실수로 인한 오류 발생",
                    "규칙이 복잡해질수록 관리가 어려워지는 문제",
                ],
            },
            Self::DistributedLookup => TemplateText {
                main_goal: "분산된 정보를 효율적으로 조회하고 통합하려는 목표",
                business_context: "여러 곳에 흩어진 데이터를 빠르게 찾아서 연결해야 하는 업무로 보입니다. 고객 정보 조회, 재고 확인, 가격 책정 등의 업무에서 자주 보이는 패턴입니다.",
                workflow: "각 시트가 특정 정보를 담당하고, 필요할 때 다른 시트에서 관련 정보를 자동으로 가져오도록 설계했습니다. 이는 데이터 중복을 최소화하면서도 필요한 정보를 빠르게 조회할 수 있게 합니다.",
                pain_points: &[
                    "필요한 정보를 찾기 위해 여러 시트를 오가는 번거로움",
                    "데이터를 수동으로 복사하면서 발생하는 동기화 문제",
                    "정보가 업데이트되어도 참조하는 곳에 반영되지 않는 문제",
                ],
            },
            Self::Summarization => TemplateText {
                main_goal: "데이터를 효과적으로 요약하고 시각화하려는 목표",
                business_context: "상세 데이터를 다양한 기준으로 집계하여 전체 현황을 파악해야 하는 업무로 보입니다. 판매 실적 분석, 프로젝트 진행 현황 파악 등의 목적일 것입니다.",
                workflow: "원본 데이터를 유지하면서 다양한 관점(시간별, 카테고리별, 담당자별 등)으로 집계하는 구조를 만들었습니다. 이를 통해 같은 데이터에서 여러 인사이트를 도출할 수 있습니다.",
                pain_points: &[
                    "데이터가 많아질수록 전체 현황을 파악하기 어려운 문제",
                    "다양한 기준으로 집계하기 위해 매번 수작업하는 불편함",
                    "집계 기준이 바뀔 때마다 처음부터 다시 작업해야 하는 비효율",
                ],
            },
            Self::GeneralManagement => TemplateText {
                main_goal: "업무 데이터를 체계적으로 관리하고 활용하려는 목표",
                business_context: "일상적인 업무에서 발생하는 데이터를 정리하고 필요할 때 쉽게 찾아 활용하기 위한 시스템으로 보입니다.",
                workflow: "각 시트가 명확한 목적을 가지고 서로 보완적인 역할을 하도록 구성했습니다. 단순하지만 실용적인 접근입니다.",
                pain_points: &[
                    "데이터가 흩어져 있어 찾기 어려운 문제",
                    "필요한 정보를 빠르게 확인하기 어려운 불편함",
                ],
            },
        }
    }
}

/// Pain point added when a logic family appears anywhere in the run
#[must_use]
pub fn logic_pain_point(kind: LogicKind) -> &'static str {
    match kind {
        LogicKind::ConditionalLogic => "다양한 예외 상황을 일일이 처리하기 어려운 문제",
        LogicKind::DataValidation => "잘못된 데이터 입력으로 인한 오류를 방지하려는 필요",
        LogicKind::DateTimeProcessing => "시간 흐름에 따른 변화를 추적하기 어려운 문제",
        LogicKind::TextProcessing => "비정형 텍스트 데이터를 표준화하고 분석하기 어려운 문제",
    }
}

const INTEGRATED_CLAUSE: &str =
    "여러 시트가 긴밀하게 연결되어 있는 것으로 보아, 하나의 통합된 시스템으로 운영하려는 의도가 강합니다.";

const MODULAR_CLAUSE: &str =
    "각 업무 영역을 분리하여 관리하면서도 필요할 때 통합할 수 있도록 모듈화한 접근입니다.";

/// Build the intent narrative for a run
///
/// Never fails: the generic template always applies.
#[must_use]
pub fn infer_intent(signals: &IntentSignals, findings: &[BusinessLogicFinding]) -> IntentInference {
    let template = IntentTemplate::select(signals);
    let text = template.text();
    tracing::debug!(?template, "intent template selected");

    let mut intent = IntentInference {
        main_goal: text.main_goal.to_string(),
        business_context: text.business_context.to_string(),
        workflow_narrative: text.workflow.to_string(),
        pain_points: Vec::new(),
    };
    for point in text.pain_points {
        intent.push_pain_point(*point);
    }

    for kind in [
        LogicKind::ConditionalLogic,
        LogicKind::DataValidation,
        LogicKind::DateTimeProcessing,
        LogicKind::TextProcessing,
    ] {
        if has_logic(findings, kind) {
            intent.push_pain_point(logic_pain_point(kind));
        }
    }

    if signals.edge_count > INTEGRATED_MIN_EDGES {
        intent.append_workflow_clause(INTEGRATED_CLAUSE);
    }
    if signals.sheet_count > MODULAR_MIN_SHEETS {
        intent.append_workflow_clause(MODULAR_CLAUSE);
    }

    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn signals() -> IntentSignals {
        IntentSignals::default()
    }

    #[test]
    fn precedence_order() {
        let all = IntentSignals {
            master: true,
            lookup: true,
            aggregation: true,
            calculation: true,
            complexity: 90,
            edge_count: 9,
            sheet_count: 9,
        };
        assert_eq!(IntentTemplate::select(&all), IntentTemplate::IntegratedAnalytics);

        let automation = IntentSignals { calculation: true, complexity: 51, lookup: true, edge_count: 9, ..signals() };
        assert_eq!(IntentTemplate::select(&automation), IntentTemplate::ProcessAutomation);

        let at_threshold = IntentSignals { calculation: true, complexity: 50, ..signals() };
        assert_eq!(IntentTemplate::select(&at_threshold), IntentTemplate::GeneralManagement);

        let lookup = IntentSignals { lookup: true, edge_count: 4, aggregation: true, ..signals() };
        assert_eq!(IntentTemplate::select(&lookup), IntentTemplate::DistributedLookup);

        let summary = IntentSignals { aggregation: true, lookup: true, edge_count: 3, ..signals() };
        assert_eq!(IntentTemplate::select(&summary), IntentTemplate::Summarization);

        let mastered = IntentSignals { aggregation: true, master: true, ..signals() };
        assert_eq!(IntentTemplate::select(&mastered), IntentTemplate::GeneralManagement);
    }

    #[test]
    fn seed_pain_point_counts() {
        assert_eq!(IntentTemplate::IntegratedAnalytics.text().pain_points.len(), 3);
        assert_eq!(IntentTemplate::GeneralManagement.text().pain_points.len(), 2);
    }

    #[test]
    fn logic_findings_append_once_each() {
        let finding = |kind: LogicKind, sheet: &str| BusinessLogicFinding {
            logic_kind: kind,
            sheet_name: sheet.to_string(),
            rationale: String::new(),
        };
        let findings = vec![
            finding(LogicKind::DateTimeProcessing, "A"),
            finding(LogicKind::DateTimeProcessing, "B"),
            finding(LogicKind::DataValidation, "A"),
        ];
        let intent = infer_intent(&signals(), &findings);
        assert_eq!(
            intent.pain_points,
            vec![
                "데이터가 흩어져 있어 찾기 어려운 문제",
                "필요한 정보를 빠르게 확인하기 어려운 불편함",
                "잘못된 데이터 입력으로 인한 오류를 방지하려는 필요",
                "시간 흐름에 따른 변화를 추적하기 어려운 문제",
            ]
        );
    }

    #[test]
    fn workflow_clauses_extend_narrative() {
        let base = infer_intent(&signals(), &[]).workflow_narrative;
        let busy = infer_intent(&IntentSignals { edge_count: 6, sheet_count: 6, ..signals() }, &[]);
        assert!(busy.workflow_narrative.starts_with(&base));
        assert!(busy.workflow_narrative.ends_with(MODULAR_CLAUSE));
        assert!(busy.workflow_narrative.contains(INTEGRATED_CLAUSE));

        let quiet = infer_intent(&IntentSignals { edge_count: 5, sheet_count: 5, ..signals() }, &[]);
        assert_eq!(quiet.workflow_narrative, base);
    }
}
