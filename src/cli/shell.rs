use std::io::{self, BufRead, Lines, StdinLock};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    history::DefaultHistory,
    Cmd, Context as ReadlineContext, Editor, Helper, Highlighter, Hinter, KeyEvent, Validator,
};

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output::info as output_info;
use crate::cli::registry::CompletionTable;

pub const SCRIPT_ENV: &str = "FINTRACK_CLI_SCRIPT";

/// Runs the shell. With `FINTRACK_CLI_SCRIPT` set, commands are read line by
/// line from stdin without prompts or colors.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => {
            let source = PromptSource::new(&context)?;
            output_info("Type `help` to list commands. Tab completes commands and views.");
            drive(&mut context, source)
        }
        CliMode::Script => drive(
            &mut context,
            ScriptSource {
                lines: io::stdin().lock().lines(),
            },
        ),
    }
}

enum Input {
    Line(String),
    Skip,
    End,
}

/// Where command lines come from. Both modes share one dispatch loop.
trait LineSource {
    fn next_line(&mut self, context: &ShellContext) -> Result<Input, CliError>;
}

fn drive(context: &mut ShellContext, mut source: impl LineSource) -> Result<(), CliError> {
    while context.running {
        let line = match source.next_line(context)? {
            Input::Line(line) => line,
            Input::Skip => continue,
            Input::End => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        match context.process_line(&line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => context.running = false,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

struct ScriptSource {
    lines: Lines<StdinLock<'static>>,
}

impl LineSource for ScriptSource {
    fn next_line(&mut self, _context: &ShellContext) -> Result<Input, CliError> {
        match self.lines.next() {
            Some(line) => Ok(Input::Line(line?)),
            None => Ok(Input::End),
        }
    }
}

struct PromptSource {
    editor: Editor<CommandHelper, DefaultHistory>,
}

impl PromptSource {
    fn new(context: &ShellContext) -> Result<Self, CliError> {
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandHelper {
            table: context.registry.completion_table(),
        }));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }
}

impl LineSource for PromptSource {
    fn next_line(&mut self, context: &ShellContext) -> Result<Input, CliError> {
        match self.editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    self.editor.add_history_entry(trimmed).ok();
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    Ok(Input::End)
                } else {
                    Ok(Input::Skip)
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                Ok(Input::End)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Helper, Highlighter, Hinter, Validator)]
struct CommandHelper {
    table: CompletionTable,
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.table.complete(line, pos);
        let candidates = words
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: format!("{} ", word),
            })
            .collect();
        Ok((start, candidates))
    }
}
