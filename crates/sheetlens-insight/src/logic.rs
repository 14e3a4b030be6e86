//! Business-logic findings from formula families

use sheetlens_formula::families;
use sheetlens_model::{BusinessLogicFinding, LogicKind, SheetSnapshot};

/// IF count a sheet must exceed to show conditional logic
pub const CONDITIONAL_MIN: usize = 3;

const LOGIC_ORDER: [LogicKind; 4] = [
    LogicKind::ConditionalLogic,
    LogicKind::DataValidation,
    LogicKind::DateTimeProcessing,
    LogicKind::TextProcessing,
];

fn finding_for(kind: LogicKind, sheet: &SheetSnapshot) -> Option<String> {
    match kind {
        LogicKind::ConditionalLogic => {
            let ifs = sheet.family_count(families::CONDITIONAL);
            (ifs > CONDITIONAL_MIN).then(|| {
                format!("조건에 따라 다른 값을 계산하는 로직이 포함되어 있습니다 (IF 함수 {ifs}개)")
            })
        }
        LogicKind::DataValidation => sheet
            .has_any(families::VALIDATION)
            .then(|| "데이터 유효성을 검사하고 오류를 처리하는 로직이 있습니다".to_string()),
        LogicKind::DateTimeProcessing => sheet
            .has_any(families::DATE_TIME)
            .then(|| "날짜와 시간을 처리하는 로직이 포함되어 있습니다".to_string()),
        LogicKind::TextProcessing => sheet
            .has_any(families::TEXT)
            .then(|| "텍스트를 조작하고 가공하는 로직이 있습니다".to_string()),
    }
}

/// Detect logic families per sheet
///
/// Findings are grouped by kind, then listed in sheet order.
#[must_use]
pub fn detect_logic(sheets: &[SheetSnapshot]) -> Vec<BusinessLogicFinding> {
    LOGIC_ORDER
        .iter()
        .flat_map(|&kind| {
            sheets.iter().filter_map(move |sheet| {
                finding_for(kind, sheet).map(|rationale| BusinessLogicFinding {
                    logic_kind: kind,
                    sheet_name: sheet.name.clone(),
                    rationale,
                })
            })
        })
        .collect()
}

/// Whether any finding of the kind exists
#[inline]
#[must_use]
pub fn has_logic(findings: &[BusinessLogicFinding], kind: LogicKind) -> bool {
    findings.iter().any(|f| f.logic_kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetlens_test_utils::SheetBuilder;

    #[test]
    fn conditional_needs_four_ifs() {
        let three = SheetBuilder::new("Three").repeat("=IF(A1>0,1,0)", 3).build();
        let four = SheetBuilder::new("Four").repeat("=IF(A1>0,1,0)", 4).build();
        let findings = detect_logic(&[three, four]);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].sheet_name, "Four");
        assert!(findings[0].rationale.contains("IF 함수 4개"));
    }

    #[test]
    fn single_occurrence_is_enough_for_families() {
        let sheet = SheetBuilder::new("Mixed")
            .formula("=IFERROR(A1/B1,0)")
            .formula("=YEAR(A1)")
            .formula("=TRIM(A1)")
            .build();
        let kinds: Vec<_> = detect_logic(&[sheet]).iter().map(|f| f.logic_kind).collect();
        assert_eq!(
            kinds,
            vec![
                LogicKind::DataValidation,
                LogicKind::DateTimeProcessing,
                LogicKind::TextProcessing
            ]
        );
    }

    #[test]
    fn findings_are_attributed_per_sheet() {
        let a = SheetBuilder::new("A").formula("=NOW()").build();
        let b = SheetBuilder::new("B").formula("=DATE(2024,1,1)").build();
        let findings = detect_logic(&[a, b]);
        let sheets: Vec<_> = findings.iter().map(|f| f.sheet_name.as_str()).collect();
        assert_eq!(sheets, vec!["A", "B"]);
        assert!(has_logic(&findings, LogicKind::DateTimeProcessing));
        assert!(!has_logic(&findings, LogicKind::TextProcessing));
    }
}
