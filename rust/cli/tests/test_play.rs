use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tiltbench_ai::StrategyKind;
use tiltbench_cli::commands::{handle_play_command, PlayOptions};
use tiltbench_engine::observation::Profile;

/// Prompt writer the test can read after the session.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn options(hands: usize) -> PlayOptions {
    PlayOptions {
        opponents: 2,
        strategies: vec![StrategyKind::Heuristic],
        profile: Profile::default(),
        hands,
        seed: Some(42),
        log: None,
        ev: false,
        table: None,
    }
}

fn play(opts: PlayOptions, input: &str) -> (String, String, String) {
    let prompt = SharedBuf::default();
    let mut out = Vec::new();
    let mut err = Vec::new();
    handle_play_command(
        opts,
        Box::new(Cursor::new(input.to_string())),
        Box::new(prompt.clone()),
        &mut out,
        &mut err,
    )
    .unwrap();
    (
        prompt.text(),
        String::from_utf8_lossy(&out).into_owned(),
        String::from_utf8_lossy(&err).into_owned(),
    )
}

#[test]
fn quitting_refunds_the_hand_in_progress() {
    let (prompt, out, _) = play(options(5), "q\n");
    assert!(prompt.contains("Options:"), "{}", prompt);
    assert!(prompt.contains("your cards"), "{}", prompt);
    assert!(out.contains("Session ended by player after 0 hands."), "{}", out);
    assert_eq!(out.matches("1000 (+0)").count(), 3, "{}", out);
}

#[test]
fn end_of_input_behaves_like_quit() {
    let (_, out, _) = play(options(5), "");
    assert!(out.contains("Session ended by player"), "{}", out);
}

#[test]
fn invalid_commands_reprompt() {
    let (prompt, out, _) = play(options(5), "dance\nbet\nq\n");
    assert!(prompt.contains("Unrecognized action: 'dance'"), "{}", prompt);
    assert!(prompt.contains("requires an amount"), "{}", prompt);
    assert!(out.contains("Session ended by player"));
}

#[test]
fn logged_session_with_scoring() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("play.jsonl");
    let mut opts = options(2);
    opts.log = Some(path.clone());
    opts.ev = true;
    let input = "c\n".repeat(400);
    let (prompt, out, err) = play(opts, &input);
    assert!(err.is_empty(), "{}", err);
    assert!(
        out.contains("Played 2 hands.") || out.contains("out of chips after 2 hands"),
        "{}",
        out
    );
    assert!(out.contains("Your decisions:"), "{}", out);
    assert!(prompt.contains("Hand "), "{}", prompt);

    let lines: Vec<Value> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.iter().filter(|v| v["type"] == "hand").count(), 2);
    let human = lines
        .iter()
        .filter(|v| v["type"] == "decision" && v["seat"] == 0)
        .count();
    assert!(human > 0);
}
