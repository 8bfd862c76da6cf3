use ledger::{CATEGORIES, CategoryTotals, Expense, ExpenseKind};

use crate::reply::Keyboard;

pub(crate) const WELCOME: &str = "Добро пожаловать! 🤑\nВыберите действие:";

pub(crate) const BTN_RECORD: &str = "Записать расход";
pub(crate) const BTN_STATS: &str = "Посмотреть статистику";
pub(crate) const BTN_RECENT: &str = "Последние траты";
pub(crate) const BTN_CREATE_FAMILY: &str = "Создать семью";
pub(crate) const BTN_JOIN_FAMILY: &str = "Вступить в семью";

pub(crate) fn main_menu() -> Keyboard {
    Keyboard::Menu(vec![
        vec![BTN_RECORD.to_string()],
        vec![BTN_STATS.to_string()],
        vec![BTN_RECENT.to_string()],
        vec![BTN_CREATE_FAMILY.to_string(), BTN_JOIN_FAMILY.to_string()],
    ])
}

/// Category picker, two buttons per row; the payload is the label itself.
pub(crate) fn categories_keyboard() -> Keyboard {
    let rows = CATEGORIES
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|label| ((*label).to_string(), (*label).to_string()))
                .collect()
        })
        .collect();
    Keyboard::Inline(rows)
}

pub(crate) fn kind_keyboard() -> Keyboard {
    Keyboard::Inline(vec![
        vec![("Личная".to_string(), "personal".to_string())],
        vec![("Семейная".to_string(), "family".to_string())],
    ])
}

pub(crate) fn skip_comment_keyboard() -> Keyboard {
    Keyboard::Inline(vec![vec![(
        "Пропустить".to_string(),
        "skip_comment".to_string(),
    )]])
}

pub(crate) fn stats_scope_keyboard() -> Keyboard {
    Keyboard::Inline(vec![
        vec![("Личная".to_string(), "personal_stats".to_string())],
        vec![("Семейная".to_string(), "family_stats".to_string())],
        vec![("Вся моя".to_string(), "all_stats".to_string())],
    ])
}

pub(crate) fn stats_period_keyboard() -> Keyboard {
    Keyboard::Inline(vec![vec![
        ("Неделя".to_string(), "period_week".to_string()),
        ("Месяц".to_string(), "period_month".to_string()),
    ]])
}

pub(crate) fn edit_fields_keyboard() -> Keyboard {
    Keyboard::Inline(vec![
        vec![("Категория".to_string(), "field:category".to_string())],
        vec![("Сумма".to_string(), "field:amount".to_string())],
        vec![("Комментарий".to_string(), "field:comment".to_string())],
    ])
}

/// One "recent expenses" card with its action buttons.
///
/// Family rows only get the delete button; edits are personal-only.
pub(crate) fn expense_card(expense: &Expense) -> (String, Keyboard) {
    let (emoji, kind) = match expense.kind {
        ExpenseKind::Personal => ("👤", "Личная"),
        ExpenseKind::Family => ("👨👩👧👦", "Семейная"),
    };
    let comment = if expense.comment.is_empty() {
        "нет комментария"
    } else {
        expense.comment.as_str()
    };
    let text = format!(
        "{emoji} {kind} трата\n🗓 {date}\n🏷 {category}\n💵 {amount} руб.\n📝 {comment}",
        date = expense.recorded_at,
        category = expense.category,
        amount = expense.amount,
    );

    let mut row = vec![("❌ Удалить".to_string(), format!("del:{}", expense.id))];
    if expense.kind == ExpenseKind::Personal {
        row.push((
            "✏️ Редактировать".to_string(),
            format!("edit:{}", expense.id),
        ));
    }

    (text, Keyboard::Inline(vec![row]))
}

/// Per-category report over one window, or the explicit no-data text.
///
/// `window` is the already formatted period phrase ("за текущий месяц (2026-08)").
pub(crate) fn stats_report(scope: &str, window: &str, totals: &CategoryTotals) -> String {
    if totals.is_empty() {
        return format!("📊 Нет данных ({scope}) {window}.");
    }
    let mut text = format!("📊 Статистика ({scope}) {window}:\n");
    for (category, sum) in &totals.by_category {
        text.push_str(&format!("{category}: {sum} руб.\n"));
    }
    text.push_str(&format!("\n💵 Общая сумма: {} руб.", totals.total));
    text
}
