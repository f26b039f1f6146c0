// Command-line definition for the `hh-updater` binary.
// Global options (URL, credentials, verbosity) can sit before or after
// the subcommand. Credentials also come from `HH_LOGIN` / `HH_PASSWORD`.

use std::time::Duration;

use clap::{Parser, Subcommand};

use hh_updater::api::DEFAULT_BASE_URL;

/// CLI инструмент для автоматического обновления резюме на HH.ru.
///
/// Позволяет автоматически "поднимать" резюме в поиске HH.ru
/// для поддержания их актуальности.
#[derive(Parser, Debug)]
#[command(name = "hh-updater", version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Подробный вывод (-v для сообщений о шагах, -vv для трассировки).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Базовый URL HH.ru (можно изменить для тестирования).
    #[arg(long = "url", env = "HH_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Логин (email) от аккаунта HH.ru.
    #[arg(long, env = "HH_LOGIN", global = true)]
    pub login: Option<String>,

    /// Пароль от аккаунта HH.ru.
    #[arg(long, env = "HH_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Таймаут одного HTTP-запроса в секундах.
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Обновить указанные резюме на HH.ru.
    ///
    /// Пример: hh-updater update cv123 cv456 --login user@email.com
    Update {
        /// Список ID резюме для обновления.
        #[arg(required = true, num_args = 1..)]
        cv_ids: Vec<String>,
    },

    /// Проверить доступность HH.ru и работу клиента.
    Check,
}
