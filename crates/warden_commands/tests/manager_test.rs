//! Tests for command registration, authentication and dispatch.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use warden_commands::{CommandProcessManager, CommandProcessor, CommandResult, SlashCommand};
use warden_error::{CommandError, CommandErrorKind, WardenErrorKind};

/// Replies with a fixed label and records the arguments it saw.
struct LabelProcessor {
    label: &'static str,
    token: &'static str,
    calls: Mutex<Vec<Vec<String>>>,
}

impl LabelProcessor {
    fn new(label: &'static str, token: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            token,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CommandProcessor for LabelProcessor {
    fn auth_token(&self) -> &str {
        self.token
    }

    fn process_command(
        &self,
        _command: &SlashCommand,
        _now: DateTime<Utc>,
        args: &[String],
    ) -> CommandResult {
        self.calls.lock().unwrap().push(args.to_vec());
        CommandResult::immediate(self.label)
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()
}

fn slash(command: &str, token: &str, text: &str) -> SlashCommand {
    SlashCommand {
        command: command.into(),
        token: token.into(),
        text: text.into(),
        ..Default::default()
    }
}

fn command_kind(result: warden_error::WardenResult<CommandResult>) -> CommandErrorKind {
    match result.unwrap_err().kind() {
        WardenErrorKind::Command(CommandError { kind, .. }) => kind.clone(),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_dispatch_trims_and_tokenizes() {
    let manager = CommandProcessManager::new();
    let duty = LabelProcessor::new("duty answer", "s3cret");
    manager.add_command_processor("duty", duty.clone());

    let result = manager
        .process_command_at(&slash(" /duty ", "s3cret", "  tomorrow   please "), now())
        .unwrap();

    assert_eq!(result, CommandResult::immediate("duty answer"));
    assert_eq!(duty.calls(), vec![vec!["tomorrow".to_string(), "please".to_string()]]);
}

#[test]
fn test_blank_text_means_no_arguments() {
    let manager = CommandProcessManager::new();
    let duty = LabelProcessor::new("duty answer", "s3cret");
    manager.add_command_processor("duty", duty.clone());

    manager.process_command_at(&slash("/duty", "s3cret", " "), now()).unwrap();
    assert_eq!(duty.calls(), vec![Vec::<String>::new()]);
}

#[test]
fn test_empty_command_rejected() {
    let manager = CommandProcessManager::new();
    let kind = command_kind(manager.process_command_at(&slash(" / ", "x", ""), now()));
    assert_eq!(kind, CommandErrorKind::EmptyCommand);
}

#[test]
fn test_unknown_command_rejected() {
    let manager = CommandProcessManager::new();
    manager.add_command_processor("duty", LabelProcessor::new("duty", "t"));

    let err = manager
        .process_command_at(&slash("/timelogs", "t", ""), now())
        .unwrap_err();
    assert_eq!(err.message(), "unknown command \"timelogs\"");
}

#[test]
fn test_invalid_token_rejected_before_processing() {
    let manager = CommandProcessManager::new();
    let duty = LabelProcessor::new("duty", "right");
    manager.add_command_processor("duty", duty.clone());

    let err = manager
        .process_command_at(&slash("/duty", "wrong", "today"), now())
        .unwrap_err();
    assert_eq!(err.message(), "validation failed: invalid token");
    assert!(!err.message().contains("wrong"));
    assert!(duty.calls().is_empty());
}

#[test]
fn test_last_registration_wins() {
    let manager = CommandProcessManager::new();
    let first = LabelProcessor::new("first", "t1");
    let second = LabelProcessor::new("second", "t2");

    assert!(manager.add_command_processor("duty", first.clone()).is_none());
    assert!(manager.add_command_processor("duty", second.clone()).is_some());

    let result = manager.process_command_at(&slash("/duty", "t2", ""), now()).unwrap();
    assert_eq!(result.text, "second");
    assert!(first.calls().is_empty());

    let kind = command_kind(manager.process_command_at(&slash("/duty", "t1", ""), now()));
    assert_eq!(kind, CommandErrorKind::InvalidToken);
    assert_eq!(manager.commands(), vec!["duty".to_string()]);
}

#[test]
fn test_concurrent_registration_and_dispatch() {
    let manager = Arc::new(CommandProcessManager::new());
    manager.add_command_processor("duty", LabelProcessor::new("duty", "t"));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                for j in 0..50 {
                    if i % 2 == 0 {
                        manager.add_command_processor(format!("cmd{}", j), LabelProcessor::new("x", "t"));
                    } else {
                        let result = manager.process_command_at(&slash("/duty", "t", ""), now());
                        assert_eq!(result.unwrap().text, "duty");
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(manager.commands().len(), 51);
}
