use anyhow::Context;
use std::io::{self, BufRead, Write};

use crate::filter::Period;
use crate::Result;

/// Line-based console questions for the interactive session
pub struct Prompter {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl Prompter {
    pub fn new(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self { input, output }
    }

    /// Prompter on the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(Box::new(io::BufReader::new(io::stdin())), Box::new(io::stdout()))
    }

    /// Print a line
    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    /// Ask a question and return the trimmed answer
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from the console")?;
        if read == 0 {
            anyhow::bail!("Input closed");
        }

        Ok(line.trim().to_string())
    }

    /// Ask until the answer is `y` or `n` (any case)
    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        loop {
            match self.ask(question)?.to_lowercase().as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => self.say("Please enter 'y' or 'n'.")?,
            }
        }
    }

    /// Ask until the answer is one of `choices`
    pub fn ask_choice(&mut self, question: &str, choices: &[&str]) -> Result<String> {
        loop {
            let answer = self.ask(question)?;
            if choices.contains(&answer.as_str()) {
                return Ok(answer);
            }
            self.say(&format!("Invalid choice. Please enter {}.", choices.join(" or ")))?;
        }
    }

    /// Ask until the answer is a valid publish period
    pub fn ask_period(&mut self) -> Result<Period> {
        loop {
            let answer = self.ask(
                "Enter the period (all, b-MM/DD/YYYY, MM/DD/YYYY-e or MM/DD/YYYY-MM/DD/YYYY): ",
            )?;
            match answer.parse::<Period>() {
                Ok(period) => return Ok(period),
                Err(e) => self.say(&format!("{}. Please try again.", e))?,
            }
        }
    }
}
