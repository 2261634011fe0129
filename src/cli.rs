//! Terminal wizard: walks the onboarding steps on stdin/stdout, then hands
//! off to the chat assistant.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::chat::ChatReply;
use crate::onboarding::{FormField, OnboardingSession, Step, render_text};

/// Fields prompted for on each structured step, with their labels.
fn step_fields(step: Step) -> &'static [(FormField, &'static str)] {
    match step {
        Step::CompanyIdentity => &[(FormField::CompanyName, "Company name")],
        Step::Website => &[(FormField::Website, "Website URL")],
        Step::SocialMedia => &[
            (FormField::Linkedin, "LinkedIn"),
            (FormField::Twitter, "Twitter"),
            (FormField::Facebook, "Facebook"),
            (FormField::Instagram, "Instagram"),
        ],
        Step::IndustryAudience => &[
            (FormField::Industry, "Industry"),
            (FormField::TargetAudience, "Target audience"),
        ],
        Step::Goal => &[(FormField::Goal, "Main goal")],
        Step::Welcome | Step::Summary | Step::Chat => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Back,
    Skip,
    Reset,
    Quit,
    Text(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "back" => Self::Back,
            "skip" => Self::Skip,
            "reset" => Self::Reset,
            "quit" | "exit" => Self::Quit,
            other => Self::Text(other.to_string()),
        }
    }
}

/// Interactive front end over an `OnboardingSession`.
pub struct Wizard<R, W> {
    lines: Lines<R>,
    out: W,
    session: Arc<OnboardingSession>,
}

impl<R, W> Wizard<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W, session: Arc<OnboardingSession>) -> Self {
        Self {
            lines: input.lines(),
            out,
            session,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    async fn say(&mut self, text: &str) -> anyhow::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Print `label` and read one line; `None` at end of input.
    async fn read_line(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        self.out.write_all(label.as_bytes()).await?;
        self.out.flush().await?;
        Ok(self.lines.next_line().await?)
    }

    async fn prompt(&mut self, label: &str) -> anyhow::Result<Input> {
        Ok(match self.read_line(label).await? {
            Some(line) => Input::parse(&line),
            None => Input::Quit,
        })
    }

    async fn show_reply(&mut self, reply: &ChatReply) -> anyhow::Result<()> {
        match reply {
            ChatReply::Ok { reply, .. } => self.say(&format!("assistant> {reply}")).await,
            ChatReply::Degraded { reply, .. } => {
                self.say("(the assistant is unreachable right now, here is an offline suggestion)")
                    .await?;
                self.say(&format!("assistant> {reply}")).await
            }
            ChatReply::Fatal { reason } => self.say(&format!("! {reason}")).await,
        }
    }

    /// Handle a navigation command. Returns `false` when the wizard should stop.
    async fn navigate(&mut self, input: &Input) -> anyhow::Result<bool> {
        match input {
            Input::Quit => return Ok(false),
            Input::Back => {
                self.session.retreat().await;
            }
            Input::Reset => {
                self.session.reset().await;
                self.say("Starting over.").await?;
            }
            Input::Skip => match self.session.skip().await {
                Some(reply) => self.show_reply(&reply).await?,
                None => self.say("Nothing to skip here.").await?,
            },
            Input::Text(_) => {}
        }
        Ok(true)
    }

    /// Run until the user quits or input ends.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let step = self.session.current_step().await;
            let keep_going = match step {
                Step::Welcome => self.welcome().await?,
                Step::Summary => self.summary().await?,
                Step::Chat => return self.chat_loop().await,
                _ => self.fill_step(step).await?,
            };
            if !keep_going {
                self.say("Bye.").await?;
                return Ok(());
            }
        }
    }

    async fn welcome(&mut self) -> anyhow::Result<bool> {
        self.say("Welcome to the plan builder. A few questions and we'll draft your plan.")
            .await?;
        self.say("Commands: back, skip, reset, quit. Leave an answer empty to keep it.")
            .await?;
        let input = self.prompt("Press Enter to begin: ").await?;
        if let Input::Text(_) = input {
            self.session.advance().await;
            return Ok(true);
        }
        self.navigate(&input).await
    }

    async fn fill_step(&mut self, step: Step) -> anyhow::Result<bool> {
        let definition = self.session.definition().await;
        let (done, total) = self.session.progress().await;
        self.say(&format!("\n[{}/{}] {}", done + 1, total, definition.title))
            .await?;

        for (field, label) in step_fields(step) {
            let current = self.session.form().await.field(*field).to_string();
            let label = if current.is_empty() {
                format!("{label}: ")
            } else {
                format!("{label} [{current}]: ")
            };
            match self.prompt(&label).await? {
                Input::Text(value) => {
                    if !value.is_empty() {
                        self.session.set_field(*field, value).await;
                    }
                }
                command => return self.navigate(&command).await,
            }
        }

        if !self.session.advance().await {
            self.say(&format!("{} is required.", definition.title)).await?;
        }
        Ok(true)
    }

    async fn summary(&mut self) -> anyhow::Result<bool> {
        let rows = self.session.summary().await;
        self.say("\nHere's what you told us:").await?;
        self.say(&render_text(&rows)).await?;

        let input = self
            .prompt("Type 'submit' to create your project (or back / skip / reset / quit): ")
            .await?;
        match input {
            Input::Text(ref text) if text == "submit" => {
                match self.session.submit().await {
                    Ok(outcome) => {
                        self.say(&format!("Project created ({}).", outcome.project_id))
                            .await?;
                        self.show_reply(&outcome.opening_reply).await?;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Submission failed");
                        self.say(&format!("Could not create the project: {e}. Try again."))
                            .await?;
                    }
                }
                Ok(true)
            }
            Input::Text(_) => Ok(true),
            command => self.navigate(&command).await,
        }
    }

    async fn chat_loop(&mut self) -> anyhow::Result<()> {
        self.say("\nChat with your plan assistant. Type 'quit' to leave.")
            .await?;
        while let Some(line) = self.read_line("you> ").await? {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            if Input::parse(text) == Input::Quit {
                break;
            }
            let reply = self.session.chat().send_message(text).await;
            self.show_reply(&reply).await?;
        }
        self.say("Bye.").await?;
        Ok(())
    }
}
