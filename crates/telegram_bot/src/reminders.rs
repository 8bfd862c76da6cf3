//! Scheduled nudges: a daily "did you record anything?" prompt and a weekly
//! statistics reminder on Sundays.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use ledger::{Ledger, UserId};

use crate::handlers;
use crate::reply::Reply;
use crate::ui;

/// Local wall-clock hours the two loops fire at.
#[derive(Clone, Copy, Debug)]
pub struct Schedule {
    pub daily_hour: u32,
    pub weekly_hour: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            daily_hour: 21,
            weekly_hour: 11,
        }
    }
}

pub(crate) async fn run(bot: teloxide::Bot, ledger: Ledger, schedule: Schedule) {
    tracing::info!(
        daily_hour = schedule.daily_hour,
        weekly_hour = schedule.weekly_hour,
        "Starting reminder loops..."
    );
    tokio::join!(
        daily_loop(&bot, &ledger, schedule.daily_hour),
        weekly_loop(&bot, &ledger, schedule.weekly_hour),
    );
}

async fn daily_loop(bot: &teloxide::Bot, ledger: &Ledger, hour: u32) {
    loop {
        let now = Utc::now().with_timezone(&ledger.timezone());
        let Some(target) = next_daily(now, hour) else {
            tracing::error!(hour, "no valid daily reminder time, loop disabled");
            return;
        };
        sleep_until(now, target).await;
        daily_pass(bot, ledger).await;
    }
}

async fn weekly_loop(bot: &teloxide::Bot, ledger: &Ledger, hour: u32) {
    loop {
        let now = Utc::now().with_timezone(&ledger.timezone());
        let Some(target) = next_weekly(now, hour) else {
            tracing::error!(hour, "no valid weekly reminder time, loop disabled");
            return;
        };
        sleep_until(now, target).await;
        weekly_pass(bot, ledger).await;
    }
}

/// Prompts everyone who has not recorded anything today.
async fn daily_pass(bot: &teloxide::Bot, ledger: &Ledger) {
    let users = match ledger.known_users().await {
        Ok(users) => users,
        Err(err) => {
            tracing::error!("daily reminder scan failed: {err}");
            return;
        }
    };

    let today = ledger.today();
    for user in users {
        match ledger.has_expense_on(user, today).await {
            Ok(true) => continue,
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(user = %user, "daily reminder check failed: {err}");
                continue;
            }
        }

        let reply = Reply::Keyboard {
            text: "Неужели ничего не потратили? Давайте вспомним и запишем основные категории."
                .to_string(),
            keyboard: ui::categories_keyboard(),
        };
        if let Err(err) = deliver(bot, user, reply).await {
            tracing::warn!(user = %user, "daily reminder send failed: {err}");
        }
    }
}

/// Sunday nudge towards the statistics menu, sent to everyone.
async fn weekly_pass(bot: &teloxide::Bot, ledger: &Ledger) {
    let users = match ledger.known_users().await {
        Ok(users) => users,
        Err(err) => {
            tracing::error!("weekly reminder scan failed: {err}");
            return;
        }
    };

    for user in users {
        let reply = Reply::Keyboard {
            text: "Все траты за неделю записаны? Время посмотреть статистику!".to_string(),
            keyboard: ui::main_menu(),
        };
        if let Err(err) = deliver(bot, user, reply).await {
            tracing::warn!(user = %user, "weekly reminder send failed: {err}");
        }
    }
}

async fn deliver(
    bot: &teloxide::Bot,
    user: UserId,
    reply: Reply,
) -> Result<(), teloxide::RequestError> {
    let chat_id = teloxide::types::ChatId::from(teloxide::types::UserId(user.0));
    handlers::send_replies(bot, chat_id, None, vec![reply]).await
}

async fn sleep_until(now: DateTime<Tz>, target: DateTime<Tz>) {
    let wait = (target - now).to_std().unwrap_or_default();
    tokio::time::sleep(wait).await;
}

/// Next `hour:00` strictly after `now`.
fn next_daily(now: DateTime<Tz>, hour: u32) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = at_hour(now.date_naive(), hour, tz)?;
    if now < today {
        return Some(today);
    }
    at_hour(now.date_naive().checked_add_days(Days::new(1))?, hour, tz)
}

/// Next Sunday `hour:00` strictly after `now`.
fn next_weekly(now: DateTime<Tz>, hour: u32) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let until_sunday = u64::from(6 - today.weekday().num_days_from_monday());
    let sunday = today.checked_add_days(Days::new(until_sunday))?;

    let target = at_hour(sunday, hour, tz)?;
    if now < target {
        return Some(target);
    }
    at_hour(sunday.checked_add_days(Days::new(7))?, hour, tz)
}

// DST gaps can make a local time not exist; `earliest` resolves folds.
fn at_hour(date: NaiveDate, hour: u32, tz: Tz) -> Option<DateTime<Tz>> {
    date.and_hms_opt(hour, 0, 0)?.and_local_timezone(tz).earliest()
}
