//! The conversation core: one inbound event in, a list of replies out.
//!
//! Every branch here is plain data in, plain data out, which keeps the whole
//! state machine testable against an in-memory ledger.

use uuid::Uuid;

use ledger::{
    Amount, DateRange, ExpenseDraft, ExpenseField, ExpenseKind, FamilyId, Ledger, LedgerError,
    StatsScope, UserId, category_is_known,
};

use crate::reply::{Event, Reply};
use crate::state::{DialogState, SessionStore};
use crate::ui;

const RECENT_LIMIT: usize = 5;

/// Routes one event through the dialog state machine.
pub async fn respond(
    ledger: &Ledger,
    sessions: &SessionStore,
    user: UserId,
    event: Event<'_>,
) -> Vec<Reply> {
    match event {
        Event::Command(command) => handle_command(ledger, sessions, user, command).await,
        Event::Text(text) => handle_text(ledger, sessions, user, text.trim()).await,
        Event::Button(payload) => handle_button(ledger, sessions, user, payload).await,
    }
}

async fn handle_command(
    ledger: &Ledger,
    sessions: &SessionStore,
    user: UserId,
    command: &str,
) -> Vec<Reply> {
    // Any command abandons an unfinished flow.
    sessions.set(user, DialogState::Idle).await;
    if command != "start" {
        return nudge();
    }

    // The sheet also gets created lazily on first write, so a failure here
    // only costs the eager provisioning.
    if let Err(err) = ledger.ensure_user(user).await {
        tracing::warn!(user = %user, "provisioning on /start failed: {err}");
    }
    vec![Reply::Keyboard {
        text: ui::WELCOME.to_string(),
        keyboard: ui::main_menu(),
    }]
}

async fn handle_text(
    ledger: &Ledger,
    sessions: &SessionStore,
    user: UserId,
    text: &str,
) -> Vec<Reply> {
    if text.is_empty() {
        return Vec::new();
    }

    // Menu taps always win over an unfinished flow.
    if is_menu_label(text) {
        sessions.set(user, DialogState::Idle).await;
        return handle_menu(ledger, sessions, user, text).await;
    }

    match sessions.state(user).await {
        DialogState::Idle => idle_text(ledger, user, text).await,
        DialogState::AwaitCategory => {
            if category_is_known(text) {
                pick_category(sessions, user, text).await
            } else {
                vec![Reply::Keyboard {
                    text: "Выберите категорию:".to_string(),
                    keyboard: ui::categories_keyboard(),
                }]
            }
        }
        DialogState::AwaitAmount { category } => match text.parse::<Amount>() {
            Ok(amount) => {
                sessions
                    .set(user, DialogState::AwaitKind { category, amount })
                    .await;
                vec![Reply::Keyboard {
                    text: "Выберите тип траты:".to_string(),
                    keyboard: ui::kind_keyboard(),
                }]
            }
            Err(_) => vec![Reply::Text(
                "Не удалось распознать сумму. Введите число, например: 150.50".to_string(),
            )],
        },
        DialogState::AwaitKind { .. } => vec![Reply::Keyboard {
            text: "Выберите тип траты:".to_string(),
            keyboard: ui::kind_keyboard(),
        }],
        DialogState::AwaitComment {
            category,
            amount,
            kind,
        } => commit_expense(ledger, sessions, user, category, amount, kind, text).await,
        DialogState::AwaitStatsPeriod { .. } => vec![Reply::Keyboard {
            text: "Выберите период:".to_string(),
            keyboard: ui::stats_period_keyboard(),
        }],
        DialogState::EditSelectField { .. } => vec![Reply::Keyboard {
            text: "Выберите поле для редактирования:".to_string(),
            keyboard: ui::edit_fields_keyboard(),
        }],
        DialogState::EditEnterValue { expense_id, field } => {
            apply_edit(ledger, sessions, user, expense_id, field, text).await
        }
    }
}

async fn handle_button(
    ledger: &Ledger,
    sessions: &SessionStore,
    user: UserId,
    payload: &str,
) -> Vec<Reply> {
    // Category buttons restart the record flow from any state; the daily
    // reminder sends the same keyboard straight into an idle chat.
    if category_is_known(payload) {
        return pick_category(sessions, user, payload).await;
    }

    if let Some(id) = payload.strip_prefix("del:") {
        return delete_expense(ledger, user, id).await;
    }
    if let Some(id) = payload.strip_prefix("edit:") {
        let Ok(expense_id) = Uuid::parse_str(id) else {
            return vec![Reply::Text("❌ Трата не найдена".to_string())];
        };
        sessions
            .set(user, DialogState::EditSelectField { expense_id })
            .await;
        return vec![Reply::Keyboard {
            text: "Выберите поле для редактирования:".to_string(),
            keyboard: ui::edit_fields_keyboard(),
        }];
    }

    match payload {
        "personal" => pick_kind(sessions, user, ExpenseKind::Personal).await,
        "family" => pick_kind(sessions, user, ExpenseKind::Family).await,
        "skip_comment" => {
            let DialogState::AwaitComment {
                category,
                amount,
                kind,
            } = sessions.state(user).await
            else {
                return stale_button(sessions, user).await;
            };
            commit_expense(ledger, sessions, user, category, amount, kind, "").await
        }
        "personal_stats" => pick_scope(sessions, user, StatsScope::Personal).await,
        "family_stats" => pick_scope(sessions, user, StatsScope::Family).await,
        "all_stats" => pick_scope(sessions, user, StatsScope::Both).await,
        "period_week" | "period_month" => {
            let DialogState::AwaitStatsPeriod { scope } = sessions.state(user).await else {
                return stale_button(sessions, user).await;
            };
            sessions.set(user, DialogState::Idle).await;
            send_report(ledger, user, scope, payload == "period_week").await
        }
        "field:category" | "field:amount" | "field:comment" => {
            let DialogState::EditSelectField { expense_id } = sessions.state(user).await else {
                return stale_button(sessions, user).await;
            };
            let field = match payload {
                "field:category" => ExpenseField::Category,
                "field:amount" => ExpenseField::Amount,
                _ => ExpenseField::Comment,
            };
            sessions
                .set(user, DialogState::EditEnterValue { expense_id, field })
                .await;
            vec![Reply::Text("Введите новое значение:".to_string())]
        }
        _ => stale_button(sessions, user).await,
    }
}

async fn handle_menu(
    ledger: &Ledger,
    sessions: &SessionStore,
    user: UserId,
    label: &str,
) -> Vec<Reply> {
    match label {
        ui::BTN_RECORD => {
            sessions.set(user, DialogState::AwaitCategory).await;
            vec![Reply::Keyboard {
                text: "Выберите категорию:".to_string(),
                keyboard: ui::categories_keyboard(),
            }]
        }
        // The scope menu is stateless; the scope button carries the payload.
        ui::BTN_STATS => vec![Reply::Keyboard {
            text: "Выберите тип статистики:".to_string(),
            keyboard: ui::stats_scope_keyboard(),
        }],
        ui::BTN_RECENT => recent_expenses(ledger, user).await,
        ui::BTN_CREATE_FAMILY => create_family(ledger, user).await,
        ui::BTN_JOIN_FAMILY => prompt_join(ledger, user).await,
        _ => nudge(),
    }
}

async fn idle_text(ledger: &Ledger, user: UserId, text: &str) -> Vec<Reply> {
    // An id pasted after the join prompt (or at any idle moment) joins.
    if let Some(family_id) = FamilyId::from_input(text) {
        return join_family(ledger, user, &family_id).await;
    }
    nudge()
}

async fn pick_category(sessions: &SessionStore, user: UserId, category: &str) -> Vec<Reply> {
    sessions
        .set(
            user,
            DialogState::AwaitAmount {
                category: category.to_string(),
            },
        )
        .await;
    vec![Reply::Text(format!(
        "Вы выбрали категорию: {category}\nТеперь введите сумму:"
    ))]
}

async fn pick_kind(sessions: &SessionStore, user: UserId, kind: ExpenseKind) -> Vec<Reply> {
    let DialogState::AwaitKind { category, amount } = sessions.state(user).await else {
        return stale_button(sessions, user).await;
    };
    sessions
        .set(
            user,
            DialogState::AwaitComment {
                category,
                amount,
                kind,
            },
        )
        .await;
    vec![Reply::Keyboard {
        text: "Введите комментарий к трате:".to_string(),
        keyboard: ui::skip_comment_keyboard(),
    }]
}

async fn pick_scope(sessions: &SessionStore, user: UserId, scope: StatsScope) -> Vec<Reply> {
    sessions
        .set(user, DialogState::AwaitStatsPeriod { scope })
        .await;
    vec![Reply::Keyboard {
        text: "Выберите период:".to_string(),
        keyboard: ui::stats_period_keyboard(),
    }]
}

async fn commit_expense(
    ledger: &Ledger,
    sessions: &SessionStore,
    user: UserId,
    category: String,
    amount: Amount,
    kind: ExpenseKind,
    comment: &str,
) -> Vec<Reply> {
    sessions.set(user, DialogState::Idle).await;

    let draft = ExpenseDraft {
        kind,
        category,
        amount,
        comment: comment.trim().to_string(),
    };
    match ledger.append_expense(user, draft).await {
        Ok(expense) => {
            let comment = if expense.comment.is_empty() {
                "нет"
            } else {
                expense.comment.as_str()
            };
            vec![Reply::Keyboard {
                text: format!(
                    "✅ Трата сохранена! Категория: {} Сумма: {} Тип: {} Комментарий: {}",
                    expense.category,
                    expense.amount,
                    expense.kind.as_cell(),
                    comment
                ),
                keyboard: ui::main_menu(),
            }]
        }
        Err(LedgerError::NoFamily) => vec![Reply::Keyboard {
            text: "❌ Вы не состоите в семье. Сначала создайте или вступите в семью.".to_string(),
            keyboard: ui::main_menu(),
        }],
        Err(err) => {
            tracing::error!(user = %user, "saving expense failed: {err}");
            vec![Reply::Keyboard {
                text: "❌ Ошибка, попробуйте снова".to_string(),
                keyboard: ui::main_menu(),
            }]
        }
    }
}

async fn send_report(ledger: &Ledger, user: UserId, scope: StatsScope, weekly: bool) -> Vec<Reply> {
    let today = ledger.today();
    let (range, window) = if weekly {
        let range = DateRange::week_of(today);
        let window = format!("за неделю (с {} по {})", range.start, range.end);
        (range, window)
    } else {
        let range = DateRange::month_of(today);
        let window = format!("за текущий месяц ({})", today.format("%Y-%m"));
        (range, window)
    };

    match ledger.aggregate(user, scope, range).await {
        Ok(totals) => vec![Reply::Text(ui::stats_report(
            scope_label(scope),
            &window,
            &totals,
        ))],
        Err(LedgerError::NoFamily) => vec![Reply::Text(
            "❌ Вы не состоите в семье. Невозможно показать семейную статистику.".to_string(),
        )],
        Err(err) => {
            tracing::error!(user = %user, "statistics failed: {err}");
            vec![Reply::Text(
                "❌ Произошла ошибка при расчете статистики. Пожалуйста, попробуйте позже."
                    .to_string(),
            )]
        }
    }
}

async fn recent_expenses(ledger: &Ledger, user: UserId) -> Vec<Reply> {
    let expenses = match ledger.list_recent(user, RECENT_LIMIT).await {
        Ok(expenses) => expenses,
        Err(err) => {
            tracing::error!(user = %user, "listing recent expenses failed: {err}");
            return vec![Reply::Text("❌ Ошибка, попробуйте снова".to_string())];
        }
    };
    if expenses.is_empty() {
        return vec![Reply::Text("📭 У вас пока нет записанных трат.".to_string())];
    }
    expenses
        .iter()
        .map(|expense| {
            let (text, keyboard) = ui::expense_card(expense);
            Reply::Keyboard { text, keyboard }
        })
        .collect()
}

async fn delete_expense(ledger: &Ledger, user: UserId, id: &str) -> Vec<Reply> {
    let Ok(expense_id) = Uuid::parse_str(id) else {
        return vec![Reply::Text("❌ Трата не найдена".to_string())];
    };
    match ledger.delete_expense(user, expense_id).await {
        Ok(ExpenseKind::Personal) => {
            vec![Reply::EditPrevious("✅ Личная трата удалена!".to_string())]
        }
        Ok(ExpenseKind::Family) => {
            vec![Reply::EditPrevious("✅ Семейная трата удалена!".to_string())]
        }
        Err(LedgerError::NotFound(_)) => vec![Reply::Text("❌ Трата не найдена".to_string())],
        Err(err) => {
            tracing::error!(user = %user, "deleting expense failed: {err}");
            vec![Reply::Text("❌ Ошибка при удалении".to_string())]
        }
    }
}

async fn apply_edit(
    ledger: &Ledger,
    sessions: &SessionStore,
    user: UserId,
    expense_id: Uuid,
    field: ExpenseField,
    value: &str,
) -> Vec<Reply> {
    match ledger.update_field(user, expense_id, field, value).await {
        Ok(()) => {
            sessions.set(user, DialogState::Idle).await;
            vec![Reply::Text("✅ Трата обновлена!".to_string())]
        }
        // Bad value: stay in the flow and let the user try again.
        Err(LedgerError::InvalidInput(_)) => {
            vec![Reply::Text("Введите новое значение:".to_string())]
        }
        Err(err) => {
            sessions.set(user, DialogState::Idle).await;
            tracing::error!(user = %user, "editing expense failed: {err}");
            vec![Reply::Text("❌ Не удалось обновить трату".to_string())]
        }
    }
}

async fn create_family(ledger: &Ledger, user: UserId) -> Vec<Reply> {
    match ledger.create_family(user).await {
        Ok(family_id) => vec![Reply::Text(format!(
            "Семья успешно создана! 🎉\nИдентификатор вашей семьи: `{family_id}`\nПоделитесь этим идентификатором с другими участниками."
        ))],
        Err(LedgerError::AlreadyMember) => vec![Reply::Text(
            "Вы уже состоите в семье. Создание новой семьи невозможно.".to_string(),
        )],
        Err(err) => {
            tracing::error!(user = %user, "creating family failed: {err}");
            vec![Reply::Text(
                "❌ Произошла ошибка при создании семьи. Пожалуйста, попробуйте позже.".to_string(),
            )]
        }
    }
}

async fn prompt_join(ledger: &Ledger, user: UserId) -> Vec<Reply> {
    match ledger.family_of(user).await {
        Ok(Some(_)) => vec![Reply::Text("Вы уже состоите в семье.".to_string())],
        Ok(None) => vec![Reply::Text("Введите идентификатор семьи:".to_string())],
        Err(err) => {
            tracing::error!(user = %user, "membership lookup failed: {err}");
            vec![Reply::Text(
                "❌ Произошла ошибка при вступлении в семью. Пожалуйста, попробуйте позже."
                    .to_string(),
            )]
        }
    }
}

async fn join_family(ledger: &Ledger, user: UserId, family_id: &FamilyId) -> Vec<Reply> {
    match ledger.join_family(user, family_id).await {
        Ok(()) => vec![Reply::Text("Вы успешно вступили в семью! 🎉".to_string())],
        Err(LedgerError::AlreadyMember) => {
            vec![Reply::Text("Вы уже состоите в семье.".to_string())]
        }
        Err(LedgerError::NotFound(_)) => vec![Reply::Text(
            "Семья с таким идентификатором не найдена. Пожалуйста, проверьте идентификатор и попробуйте снова."
                .to_string(),
        )],
        Err(err) => {
            tracing::error!(user = %user, "joining family failed: {err}");
            vec![Reply::Text(
                "❌ Произошла ошибка при вступлении в семью. Пожалуйста, попробуйте позже."
                    .to_string(),
            )]
        }
    }
}

async fn stale_button(sessions: &SessionStore, user: UserId) -> Vec<Reply> {
    // A button from an earlier message no longer matches the flow.
    sessions.set(user, DialogState::Idle).await;
    nudge()
}

fn nudge() -> Vec<Reply> {
    vec![Reply::Keyboard {
        text: "Пожалуйста, выберите действие из меню.".to_string(),
        keyboard: ui::main_menu(),
    }]
}

fn scope_label(scope: StatsScope) -> &'static str {
    match scope {
        StatsScope::Personal => "Личная",
        StatsScope::Family => "Семейная",
        StatsScope::Both => "Вся моя",
    }
}

fn is_menu_label(text: &str) -> bool {
    matches!(
        text,
        ui::BTN_RECORD | ui::BTN_STATS | ui::BTN_RECENT | ui::BTN_CREATE_FAMILY | ui::BTN_JOIN_FAMILY
    )
}
