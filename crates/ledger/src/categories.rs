//! The fixed expense category set.
//!
//! Labels are user-facing and stored verbatim in sheet cells, so the list
//! order is also the menu and report order.

/// Categories offered when recording an expense, in display order.
pub const CATEGORIES: [&str; 17] = [
    "🍔 Еда вне дома",
    "🛒 Продукты",
    "🎮 Развлечения",
    "👕 Одежда",
    "✈️ Путешествия",
    "🧠 Психология/Обучение",
    "🏃‍♀️ Здоровье/Спорт",
    "👶 Дети",
    "👵 Родители",
    "🎁 Подарки",
    "🚗 Транспорт",
    "🏠 Жилье",
    "💳 Кредиты",
    "💰 Откладываем",
    "💵 Алименты",
    "⚡️ Маркетплейсы",
    "💼 Прочее",
];

/// Returns `true` if `label` is one of [`CATEGORIES`].
#[must_use]
pub fn category_is_known(label: &str) -> bool {
    CATEGORIES.contains(&label)
}
