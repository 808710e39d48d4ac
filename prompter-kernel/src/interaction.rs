//! Human-in-the-loop hooks run before each completion request.

use async_trait::async_trait;
use prompter_primitives::Role;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{PromptError, PromptResult, Prompter};

/// Hook given the live conversation right before the model is asked to reply.
///
/// An implementation may append at most one message. Returning
/// [`PromptError::Aborted`] ends the session.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Runs the hook.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Aborted`] on an intentional exit, or any error
    /// raised while appending the injected message.
    async fn interact(&self, prompter: &mut Prompter) -> PromptResult<()>;
}

/// Line-based interaction over an input and an output stream.
///
/// Each call writes a prompt, reads one line and appends it with the
/// configured role. An empty line continues without injecting anything; end
/// of input or a lone `x` aborts.
#[derive(Debug)]
pub struct ConsoleInteraction<R, W> {
    role: Role,
    reader: Mutex<R>,
    writer: Mutex<W>,
}

/// Interaction reading from the process's standard input.
pub type StdinInteraction = ConsoleInteraction<BufReader<Stdin>, Stdout>;

impl ConsoleInteraction<BufReader<Stdin>, Stdout> {
    /// Creates an interaction on stdin/stdout injecting messages as `role`.
    #[must_use]
    pub fn stdin(role: Role) -> Self {
        Self::new(role, BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> ConsoleInteraction<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates an interaction over arbitrary streams.
    #[must_use]
    pub fn new(role: Role, reader: R, writer: W) -> Self {
        Self {
            role,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    /// Role given to injected messages.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Consumes the interaction and returns the output stream.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    async fn write(&self, text: &str) -> PromptResult<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<R, W> Interaction for ConsoleInteraction<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn interact(&self, prompter: &mut Prompter) -> PromptResult<()> {
        self.write(&format!(
            "Input(role={:?}, continue=\"↵\", exit=\"x or Ctrl+D\"): ",
            self.role.as_str()
        ))
        .await?;

        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        let content = line.trim_end_matches(['\r', '\n']);
        if read == 0 || content == "x" {
            self.write(" user aborted\n").await?;
            debug!(role = self.role.as_str(), "interaction aborted");
            return Err(PromptError::Aborted);
        }
        self.write("\n").await?;

        if !content.is_empty() {
            prompter.append_message(content, self.role).await?;
        }
        Ok(())
    }
}
