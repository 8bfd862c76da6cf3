//! Telegram front end for the expense ledger.
//!
//! The conversation core (`dialog::respond`) is transport-agnostic: it turns
//! [`Event`]s into [`Reply`] lists without touching teloxide types. This crate
//! wires it to the update loop and runs the reminder schedule.

use teloxide::prelude::*;

use ledger::Ledger;

mod dialog;
mod handlers;
mod reminders;
mod reply;
mod state;
mod ui;

pub use dialog::respond;
pub use reminders::Schedule;
pub use reply::{Event, Keyboard, Reply};
pub use state::{DialogState, SessionStore};

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    ledger: Ledger,
    sessions: SessionStore,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    ledger: Ledger,
    schedule: Schedule,
}

impl Bot {
    pub fn new(
        token: &str,
        allowed_users: Option<Vec<UserId>>,
        ledger: Ledger,
        schedule: Schedule,
    ) -> Result<Self, String> {
        if token.trim().is_empty() {
            return Err("telegram token is empty".to_string());
        }

        Ok(Self {
            token: token.to_string(),
            allowed_users,
            ledger,
            schedule,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        tokio::spawn(reminders::run(
            bot.clone(),
            self.ledger.clone(),
            self.schedule,
        ));

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            ledger: self.ledger.clone(),
            sessions: SessionStore::new(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    ledger: Option<Ledger>,
    schedule: Schedule,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn allowed_users(mut self, allowed_users: Vec<u64>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users.into_iter().map(UserId).collect());
        }
        self
    }

    pub fn ledger(mut self, ledger: Ledger) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn schedule(mut self, schedule: Schedule) -> BotBuilder {
        self.schedule = schedule;
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let Some(ledger) = self.ledger else {
            return Err("telegram bot needs a ledger".to_string());
        };
        Bot::new(&self.token, self.allowed_users, ledger, self.schedule)
    }
}
