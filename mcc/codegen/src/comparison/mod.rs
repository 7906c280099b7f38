//! Conditions and the lowering of if, elif and else
//!
//! A condition is a [`ComparisonSet`]. Its terms produce setup commands and fragments of an
//! `execute` command. If nothing can follow the `if`, the fragments guard the body directly.
//! Otherwise the outcome is stored in a result store, a fake player on the temp objective,
//! which the following `elif` or `else` tests.
use mcc_error::{Result, StatementErrorKind};
use mcc_parser::statement::Statement;
use tracing::trace;

use crate::{
    command_file::CommandFile,
    commands::{execute_prefix, ExecuteComponent, MinecraftCommand, MinecraftRange, ScoreboardPlayer},
    executor::{Executor, PreviousComparison, Section},
};

mod set;
mod term;

pub use set::ComparisonSet;
pub use term::{Comparison, Term};

/// Runs `if <condition>` and its body
pub fn run_if(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let set = ComparisonSet::parse(executor, statement, statement.arguments())?;
    let body = executor.next_body(statement)?;
    let with_else = executor.next_is_else_chain();
    branch(executor, set, Chain::default(), body, with_else)
}

/// Runs `elif <condition>`, which only runs if no previous branch of the chain ran
pub fn run_elif(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let previous = take_previous(executor, statement)?;
    let set = ComparisonSet::parse(executor, statement, statement.arguments())?;
    let body = executor.next_body(statement)?;
    let with_else = executor.next_is_else_chain();

    match previous {
        PreviousComparison::Static(true) => {
            trace!("Skipping elif, a previous branch always runs");
            if with_else {
                executor.set_last_compare(Some(PreviousComparison::Static(true)));
            }
            Ok(())
        }
        PreviousComparison::Static(false) => branch(executor, set, Chain::default(), body, with_else),
        PreviousComparison::Runtime {
            stores,
            description,
        } => branch(
            executor,
            set,
            Chain {
                stores,
                description,
            },
            body,
            with_else,
        ),
    }
}

/// Runs `else`, which only runs if no previous branch of the chain ran
pub fn run_else(executor: &mut Executor, statement: &Statement) -> Result<()> {
    let previous = take_previous(executor, statement)?;
    let body = executor.next_body(statement)?;

    match previous {
        PreviousComparison::Static(true) => {
            trace!("Skipping else, a previous branch always runs");
            Ok(())
        }
        PreviousComparison::Static(false) => executor.run_guarded(None, body),
        PreviousComparison::Runtime {
            stores,
            description,
        } => {
            executor.decorate(format_args!("else, not {description}"));
            let prefix = execute_prefix(&none_taken(&stores));
            executor.run_guarded(Some(&prefix), body)
        }
    }
}

fn take_previous(executor: &mut Executor, statement: &Statement) -> Result<PreviousComparison> {
    executor.take_last_compare().ok_or_else(|| {
        statement.error(StatementErrorKind::ElseWithoutIf {
            keyword: statement.keyword().unwrap_or_default().to_string(),
        })
    })
}

/// The runtime branches which precede the current one
#[derive(Debug, Default)]
struct Chain {
    stores: Vec<ScoreboardPlayer>,
    description: String,
}

/// Tests that none of the branches which stored their outcome into `stores` ran
fn none_taken(stores: &[ScoreboardPlayer]) -> Vec<ExecuteComponent> {
    stores
        .iter()
        .map(|store| ExecuteComponent::IfScoreRange {
            player: store.clone(),
            range: MinecraftRange::Equal(0),
            inverted: false,
        })
        .collect()
}

/// Runs `body` if the previous branches of `chain` did not run and `set` passes
fn branch(
    executor: &mut Executor,
    mut set: ComparisonSet,
    mut chain: Chain,
    body: Section,
    with_else: bool,
) -> Result<()> {
    let record = match set.fold() {
        Some(false) => {
            trace!(condition = %set, "Condition never passes, skipping the body");
            if chain.stores.is_empty() {
                PreviousComparison::Static(false)
            } else {
                PreviousComparison::Runtime {
                    stores: chain.stores,
                    description: chain.description,
                }
            }
        }
        Some(true) => {
            if chain.stores.is_empty() {
                executor.run_guarded(None, body)?;
            } else {
                let prefix = execute_prefix(&none_taken(&chain.stores));
                executor.run_guarded(Some(&prefix), body)?;
            }
            PreviousComparison::Static(true)
        }
        None => {
            let description = set.to_string();
            executor.decorate(format_args!("if {description}"));

            let mut fragments = none_taken(&chain.stores);
            fragments.extend(set.fragments());
            let mut setup = set.setup();

            let prefix = if with_else {
                let store = executor.alloc_result_store();
                setup.push(MinecraftCommand::ScoreboardSet {
                    player: store.clone(),
                    value: 0,
                });
                setup.push(MinecraftCommand::Execute {
                    parts: fragments,
                    and_then: Some(Box::new(MinecraftCommand::ScoreboardSet {
                        player: store.clone(),
                        value: 1,
                    })),
                });
                let prefix = execute_prefix(&[ExecuteComponent::IfScoreRange {
                    player: store.clone(),
                    range: MinecraftRange::Equal(1),
                    inverted: false,
                }]);
                chain.stores.push(store);
                prefix
            } else {
                execute_prefix(&fragments)
            };

            run_setup(executor, &setup);
            executor.run_guarded(Some(&prefix), body)?;

            if !chain.description.is_empty() {
                chain.description.push_str(", ");
            }
            chain.description.push_str(&description);
            PreviousComparison::Runtime {
                stores: chain.stores,
                description: chain.description,
            }
        }
    };

    executor.set_last_compare(with_else.then_some(record));
    Ok(())
}

/// Moves the setup commands into their own file, which is called unconditionally
fn run_setup(executor: &mut Executor, setup: &[MinecraftCommand]) {
    if setup.is_empty() {
        return;
    }

    let file = executor.new_setup_file();
    executor.push_file(file);
    for command in setup {
        executor.emit(command);
    }
    let file: CommandFile = executor.pop_file();
    let function = executor.finish_file(file);
    executor.emit(&MinecraftCommand::Function { function });
}
