use std::sync::Arc;

use ledger::{GoogleSheets, Ledger, MemorySheets, SheetStore};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kopilka={level},telegram_bot={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    let ledger = Ledger::new(build_store(settings.store), settings.app.timezone);

    if let Some(telegram) = settings.telegram {
        let schedule = settings
            .reminders
            .map(|reminders| telegram_bot::Schedule {
                daily_hour: reminders.daily_hour,
                weekly_hour: reminders.weekly_hour,
            })
            .unwrap_or_default();
        tasks.spawn(async move {
            tracing::info!("Found telegram settings...");
            match telegram_bot::Bot::builder()
                .token(&telegram.token)
                .allowed_users(telegram.allowed_users.unwrap_or_default())
                .ledger(ledger)
                .schedule(schedule)
                .build()
            {
                Ok(bot) => bot.run().await,
                Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

fn build_store(config: settings::Store) -> Arc<dyn SheetStore> {
    match config {
        settings::Store::Memory => Arc::new(MemorySheets::new()),
        settings::Store::Google(google) => Arc::new(GoogleSheets::new(
            reqwest::Client::new(),
            google.spreadsheet_id,
            google.token,
        )),
    }
}
