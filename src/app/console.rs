use crate::app::render;
use crate::core::service::StockService;
use crate::domain::model::StockResult;
use crate::domain::ports::{InventoryApi, SessionStore};
use crate::utils::error::{InventoryError, Result};
use inquire::{InquireError, Password, PasswordDisplayMode};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "Commands:
  login                 log in and remember the session
  register              create an account
  stock <sku> [base]    show stock per variant (base defaults to the configured one)
  logout                forget the saved session
  status                show whether a session is saved
  help                  show this message
  quit                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Register,
    Stock { sku: String, base: Option<String> },
    Logout,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Command::Empty;
    };

    match verb.to_ascii_lowercase().as_str() {
        "login" => Command::Login,
        "register" => Command::Register,
        "stock" | "s" => match words.next() {
            Some(sku) => Command::Stock {
                sku: sku.to_string(),
                base: words.next().map(str::to_string),
            },
            None => Command::Unknown(line.trim().to_string()),
        },
        "logout" => Command::Logout,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(line.trim().to_string()),
    }
}

/// State owned by the stock screen between commands.
#[derive(Debug, Default)]
pub struct StockScreen {
    pub result: Option<StockResult>,
    pub notice: Option<String>,
}

impl StockScreen {
    fn show(&mut self, result: StockResult) {
        self.result = Some(result);
        self.notice = None;
    }

    /// A failed query never leaves an older result on screen.
    fn fail(&mut self, notice: String) {
        self.result = None;
        self.notice = Some(notice);
    }
}

/// Where the console reads passwords from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordInput {
    /// Same input stream as the commands; used for scripted sessions.
    #[default]
    Line,
    /// Hidden terminal prompt. Needs an interactive terminal.
    Masked,
}

enum Credentials {
    Entered(String, String),
    Cancelled,
    Closed,
}

/// Line-driven front end over a [`StockService`].
pub struct Console<'a, A: InventoryApi, S: SessionStore> {
    service: &'a StockService<A, S>,
    screen: StockScreen,
    password_input: PasswordInput,
}

impl<'a, A: InventoryApi, S: SessionStore> Console<'a, A, S> {
    pub fn new(service: &'a StockService<A, S>) -> Self {
        Self {
            service,
            screen: StockScreen::default(),
            password_input: PasswordInput::default(),
        }
    }

    pub fn with_password_input(mut self, password_input: PasswordInput) -> Self {
        self.password_input = password_input;
        self
    }

    pub fn screen(&self) -> &StockScreen {
        &self.screen
    }

    pub async fn run<R, W>(&mut self, mut input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "{}", HELP)?;

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = read_line(&mut input).await? else {
                break;
            };

            match parse_command(&line) {
                Command::Quit => break,
                Command::Empty => {}
                Command::Help => writeln!(out, "{}", HELP)?,
                Command::Unknown(text) => writeln!(out, "Unknown command '{}'. Type 'help'.", text)?,
                Command::Status => {
                    let message = match self.service.has_session().await {
                        Ok(true) => "Logged in".to_string(),
                        Ok(false) => "Not logged in".to_string(),
                        Err(e) => render::render_error(&e),
                    };
                    writeln!(out, "{}", message)?;
                }
                Command::Logout => match self.service.logout().await {
                    Ok(()) => {
                        self.screen = StockScreen::default();
                        writeln!(out, "Logged out")?;
                    }
                    Err(e) => writeln!(out, "{}", render::render_error(&e))?,
                },
                Command::Login => {
                    let (username, password) =
                        match prompt_credentials(&mut input, out, self.password_input).await? {
                            Credentials::Entered(username, password) => (username, password),
                            Credentials::Cancelled => {
                                writeln!(out, "Cancelled")?;
                                continue;
                            }
                            Credentials::Closed => break,
                        };
                    match self.service.login(&username, &password).await {
                        Ok(()) => writeln!(out, "Logged in as {}", username.trim())?,
                        Err(e) => writeln!(out, "{}", render::render_error(&e))?,
                    }
                }
                Command::Register => {
                    let (username, password) =
                        match prompt_credentials(&mut input, out, self.password_input).await? {
                            Credentials::Entered(username, password) => (username, password),
                            Credentials::Cancelled => {
                                writeln!(out, "Cancelled")?;
                                continue;
                            }
                            Credentials::Closed => break,
                        };
                    match self.service.register(&username, &password).await {
                        Ok(()) => writeln!(out, "User registered. You can log in now.")?,
                        Err(e) => writeln!(out, "{}", render::render_error(&e))?,
                    }
                }
                Command::Stock { sku, base } => {
                    let base = base.unwrap_or_else(|| self.service.default_base().to_string());
                    match self.service.query(&sku, &base).await {
                        Ok(result) => {
                            writeln!(out, "{}", render::render_stock(&result))?;
                            self.screen.show(result);
                        }
                        Err(e) => {
                            let notice = render::render_error(&e);
                            writeln!(out, "{}", notice)?;
                            if e.requires_reauthentication() {
                                writeln!(out, "Please log in again.")?;
                            }
                            self.screen.fail(notice);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

async fn prompt_credentials<R, W>(
    input: &mut R,
    out: &mut W,
    password_input: PasswordInput,
) -> Result<Credentials>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "username: ")?;
    out.flush()?;
    let Some(username) = read_line(input).await? else {
        return Ok(Credentials::Closed);
    };

    let password = match password_input {
        PasswordInput::Line => {
            write!(out, "password: ")?;
            out.flush()?;
            read_line(input).await?
        }
        PasswordInput::Masked => match read_masked_password().await? {
            Some(password) => Some(password),
            None => return Ok(Credentials::Cancelled),
        },
    };

    Ok(match password {
        Some(password) => Credentials::Entered(username, password),
        None => Credentials::Closed,
    })
}

/// `None` when the user dismissed the prompt.
async fn read_masked_password() -> Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| {
        Password::new("password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
    })
    .await
    .map_err(|e| InventoryError::IoError(std::io::Error::other(e)))?;

    match answer {
        Ok(password) => Ok(Some(password)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(InventoryError::IoError(std::io::Error::other(e))),
    }
}
