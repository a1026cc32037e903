//! Line-oriented terminal I/O shared by every screen

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, IsTerminal, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};

type Reader = Box<dyn AsyncBufRead + Unpin + Send>;
type Writer = Box<dyn AsyncWrite + Unpin + Send>;

/// One answer to a form prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Value(String),
    /// Input closed
    Eof,
}

pub struct Console {
    lines: Lines<Reader>,
    writer: Writer,
    interactive: bool,
}

impl Console {
    pub fn new(reader: Reader, writer: Writer, interactive: bool) -> Self {
        Self {
            lines: reader.lines(),
            writer,
            interactive,
        }
    }

    /// Console over the process's stdin and stdout
    pub fn stdio() -> Self {
        let interactive = io::stdin().is_terminal();
        Self::new(
            Box::new(BufReader::new(tokio::io::stdin())),
            Box::new(tokio::io::stdout()),
            interactive,
        )
    }

    /// Whether a person is typing (as opposed to piped input)
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Next input line without its line ending. Cancel safe.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim_end_matches('\r').to_string()))
    }

    pub async fn write_prompt(&mut self, label: &str) -> Result<()> {
        self.writer.write_all(label.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Show `label` and read one form field
    pub async fn prompt(&mut self, label: &str) -> Result<Input> {
        self.write_prompt(label).await?;
        Ok(match self.next_line().await? {
            Some(line) => Input::Value(line),
            None => Input::Eof,
        })
    }

    /// Like [`Console::prompt`], but a person typing sees `*` instead of
    /// their keys. Piped input is read as a plain line.
    pub async fn prompt_hidden(&mut self, label: &str) -> Result<Input> {
        if !self.interactive {
            return self.prompt(label).await;
        }

        self.write_prompt(label).await?;
        let typed = tokio::task::spawn_blocking(read_hidden_line)
            .await
            .context("Hidden input task failed")??;

        Ok(match typed {
            Some(secret) => Input::Value(secret),
            None => Input::Eof,
        })
    }

    pub async fn say(&mut self, message: &str) -> Result<()> {
        self.writer.write_all(message.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Modal error: the operation was aborted and the user may retry
    pub async fn error_dialog(&mut self, title: &str, message: &str) -> Result<()> {
        self.say(&format!("[{}] {}", title, message)).await
    }

    pub async fn info_dialog(&mut self, title: &str, message: &str) -> Result<()> {
        self.say(&format!("[{}] {}", title, message)).await
    }
}

/// What one key press did to a hidden line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HiddenKey {
    Typed,
    Erased,
    Ignored,
    Submit,
    Cancel,
}

fn apply_key(secret: &mut String, key: &KeyEvent) -> HiddenKey {
    if key.kind == KeyEventKind::Release {
        return HiddenKey::Ignored;
    }

    match key.code {
        KeyCode::Enter => HiddenKey::Submit,
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            HiddenKey::Cancel
        }
        KeyCode::Char(c) => {
            secret.push(c);
            HiddenKey::Typed
        }
        KeyCode::Backspace if secret.pop().is_some() => HiddenKey::Erased,
        _ => HiddenKey::Ignored,
    }
}

/// Read one line from the terminal with echo off. `None` on Ctrl-C/Ctrl-D.
fn read_hidden_line() -> io::Result<Option<String>> {
    enable_raw_mode()?;
    let result = read_hidden_keys();
    disable_raw_mode()?;
    result
}

fn read_hidden_keys() -> io::Result<Option<String>> {
    let mut out = io::stdout();
    let mut secret = String::new();

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match apply_key(&mut secret, &key) {
            HiddenKey::Typed => write!(out, "*")?,
            HiddenKey::Erased => write!(out, "\x08 \x08")?,
            HiddenKey::Ignored => continue,
            HiddenKey::Submit => {
                write!(out, "\r\n")?;
                out.flush()?;
                return Ok(Some(secret));
            }
            HiddenKey::Cancel => {
                write!(out, "\r\n")?;
                out.flush()?;
                return Ok(None);
            }
        }
        out.flush()?;
    }
}
