use crate::domain::model::{
    CaseTable, Column, ExportedRow, Expected, Locale, StepItem, Steps, TestCase, TestData,
    COLUMN_COUNT,
};

fn first_non_empty(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .filter_map(|candidate| candidate.as_deref())
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Numbered lines for a `steps` value. Skipped elements still consume their number.
pub fn format_steps(steps: Option<&Steps>) -> String {
    match steps {
        Some(Steps::List(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                StepItem::Text(text) | StepItem::Action(text) => {
                    Some(format!("{}. {}", index + 1, text))
                }
                StepItem::Skipped => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Steps::Text(text)) => text.clone(),
        Some(Steps::Other) | None => String::new(),
    }
}

pub fn format_expected(expected: Option<&Expected>) -> String {
    match expected {
        Some(Expected::List(items)) => items
            .iter()
            .enumerate()
            .map(|(index, text)| format!("{}. {}", index + 1, text))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Expected::Text(text)) => text.clone(),
        Some(Expected::Other) | None => String::new(),
    }
}

pub fn format_test_data(test_data: Option<&TestData>) -> String {
    match test_data {
        Some(TestData::Fields(fields)) => fields
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(TestData::Text(text)) => text.clone(),
        Some(TestData::Other) | None => String::new(),
    }
}

pub fn project_row(case: &TestCase, locale: Locale) -> ExportedRow {
    let mut cells: [String; COLUMN_COUNT] = Default::default();

    for column in Column::ALL {
        cells[column.index()] = match column {
            Column::Id => first_non_empty(&[&case.id, &case.case_id]),
            Column::Name => first_non_empty(&[&case.title, &case.name]),
            Column::Module => first_non_empty(&[&case.module, &case.category]),
            Column::Priority => first_non_empty(&[&case.priority]),
            Column::Preconditions => first_non_empty(&[&case.preconditions]),
            Column::Steps => format_steps(case.steps.as_ref()),
            Column::Expected => format_expected(case.expected.as_ref()),
            Column::TestData => format_test_data(case.test_data.as_ref()),
            Column::Status => match case.status.as_deref() {
                Some(status) if !status.is_empty() => status.to_string(),
                _ => locale.not_executed().to_string(),
            },
            Column::Author => first_non_empty(&[&case.author]),
            Column::Created => first_non_empty(&[&case.created_date]),
            Column::Remarks => first_non_empty(&[&case.remarks]),
        };
    }

    ExportedRow::new(cells)
}

pub fn project_table(cases: &[TestCase], locale: Locale) -> CaseTable {
    CaseTable::new(
        locale,
        cases.iter().map(|case| project_row(case, locale)).collect(),
    )
}
