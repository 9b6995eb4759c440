//! Card, board, action and hand-result formatters for terminal display.
//!
//! Suits render as ♥ ♦ ♣ ♠ where the terminal supports them and fall back
//! to h d c s otherwise.
//!
//! ```rust
//! use tiltbench_engine::cards::{Card, Rank, Suit};
//! use tiltbench_cli::formatters::{format_board, format_card};
//!
//! let ace_spades = Card::new(Rank::Ace, Suit::Spades);
//! assert!(format_card(&ace_spades) == "A♠" || format_card(&ace_spades) == "As");
//! assert_eq!(format_board(&[]), "[]");
//! ```

use tiltbench_engine::cards::{Card, Suit};
use tiltbench_engine::events::HandRecord;
use tiltbench_engine::rules::Action;

/// Unicode suits on Unix; on Windows only inside terminals known to render them.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

pub fn format_suit(suit: Suit) -> String {
    if supports_unicode() {
        match suit {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
        .to_string()
    } else {
        suit.letter().to_string()
    }
}

pub fn format_card(card: &Card) -> String {
    format!("{}{}", card.rank.symbol(), format_suit(card.suit))
}

/// Space separated cards without brackets, e.g. hole cards.
pub fn format_cards(cards: &[Card]) -> String {
    cards.iter().map(format_card).collect::<Vec<_>>().join(" ")
}

/// Board in bracket notation; `[]` before the flop.
pub fn format_board(cards: &[Card]) -> String {
    format!("[{}]", format_cards(cards))
}

/// `all_in` adds a marker when the amount is the seat's whole stack.
pub fn format_action(action: &Action, all_in: bool) -> String {
    if all_in && action.amount() > 0 {
        format!("{} (all-in)", action)
    } else {
        action.to_string()
    }
}

/// Multi-line result of a finished hand: board, showdown, net chips per seat.
pub fn format_hand_summary(record: &HandRecord, names: &[String]) -> String {
    let name = |seat: usize| {
        names
            .get(seat)
            .cloned()
            .unwrap_or_else(|| format!("seat {}", seat))
    };
    let mut lines = vec![format!(
        "Hand {} ended on the {}: board {}",
        record.hand_id,
        record.final_street,
        format_board(&record.board)
    )];
    if let Some(showdown) = &record.showdown {
        for shown in &showdown.hands {
            lines.push(format!(
                "  {} shows {} ({})",
                name(shown.seat),
                format_cards(&shown.hole_cards),
                shown.rank.category.name()
            ));
        }
    }
    for (seat, net) in record.net().into_iter().enumerate() {
        if net != 0 {
            lines.push(format!("  {} {:+}", name(seat), net));
        }
    }
    lines.join("\n")
}
