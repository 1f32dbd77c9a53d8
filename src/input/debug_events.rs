//! Parser for the text stream printed by `libinput debug-events`.
//!
//! Lines look like
//!
//! ```text
//! -event9   DEVICE_ADDED            SynPS/2 Synaptics TouchPad  seat0 default group7  cap:pg
//!  event9   GESTURE_SWIPE_UPDATE    +2.351s  3  0.64/ 0.00 ( 1.87/ 0.00 unaccelerated)
//!  event9   GESTURE_PINCH_UPDATE    +4.010s  2  0.11/-0.24 ( 0.33/-0.72 unaccelerated)  1.02 @  0.50
//!  event5   TOUCH_DOWN              +1.000s  0 (0) 49.65/43.36 (124.11/108.39mm)
//!  event5   TOUCH_UP                +1.100s  0 (0)
//! ```
//!
//! Gesture updates use the unaccelerated delta. Touch positions use the
//! millimetre pair when present so both axes share a unit.

use thiserror::Error;

use crate::gesture::{DeviceCapabilities, InputEvent};

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("{kind}: missing timestamp")]
    MissingTimestamp { kind: String },
    #[error("{kind}: invalid timestamp '{raw}'")]
    InvalidTimestamp { kind: String, raw: String },
    #[error("{kind}: expected at least {expected} numeric fields, found {found}")]
    MissingFields {
        kind: String,
        expected: usize,
        found: usize,
    },
    #[error("{kind}: invalid number '{raw}'")]
    InvalidNumber { kind: String, raw: String },
}

/// Parses one line. Blank lines and event kinds the router has no use for
/// come back as [`InputEvent::Ignored`].
pub fn parse_line(line: &str) -> Result<InputEvent, ParseError> {
    let mut tokens = line.split_whitespace();
    let (Some(_device), Some(kind)) = (tokens.next(), tokens.next()) else {
        return Ok(InputEvent::Ignored);
    };
    let rest = remainder_after(line, kind);

    match kind {
        "DEVICE_ADDED" => Ok(InputEvent::DeviceAdded(parse_capabilities(rest))),
        "GESTURE_SWIPE_BEGIN" => {
            let body = Body::parse(kind, rest)?;
            Ok(InputEvent::SwipeBegin {
                fingers: body.fingers()?,
            })
        }
        "GESTURE_SWIPE_UPDATE" => {
            let body = Body::parse(kind, rest)?;
            body.require(5)?;
            Ok(InputEvent::SwipeUpdate {
                fingers: body.fingers()?,
                dx: body.numbers[3],
                dy: body.numbers[4],
            })
        }
        "GESTURE_SWIPE_END" => {
            let body = Body::parse(kind, rest)?;
            Ok(InputEvent::SwipeEnd {
                fingers: body.fingers()?,
                cancelled: body.cancelled,
            })
        }
        "GESTURE_PINCH_BEGIN" => {
            let body = Body::parse(kind, rest)?;
            Ok(InputEvent::PinchBegin {
                fingers: body.fingers()?,
            })
        }
        "GESTURE_PINCH_UPDATE" => {
            let body = Body::parse(kind, rest)?;
            body.require(6)?;
            Ok(InputEvent::PinchUpdate {
                fingers: body.fingers()?,
                scale: body.numbers[5],
            })
        }
        "GESTURE_PINCH_END" => {
            let body = Body::parse(kind, rest)?;
            Ok(InputEvent::PinchEnd {
                fingers: body.fingers()?,
                scale: body.numbers.get(5).copied(),
                cancelled: body.cancelled,
            })
        }
        "TOUCH_DOWN" | "TOUCH_MOTION" => {
            let body = Body::parse(kind, rest)?;
            body.require(4)?;
            let (x, y) = match body.numbers.get(4..6) {
                Some(&[x_mm, y_mm]) => (x_mm, y_mm),
                _ => (body.numbers[2], body.numbers[3]),
            };
            let slot = body.slot()?;
            if kind == "TOUCH_DOWN" {
                Ok(InputEvent::TouchDown {
                    slot,
                    time_ms: body.time_ms,
                    x,
                    y,
                })
            } else {
                Ok(InputEvent::TouchMotion {
                    slot,
                    time_ms: body.time_ms,
                    x,
                    y,
                })
            }
        }
        "TOUCH_UP" => {
            let body = Body::parse(kind, rest)?;
            Ok(InputEvent::TouchUp {
                slot: body.slot()?,
                time_ms: body.time_ms,
            })
        }
        _ => Ok(InputEvent::Ignored),
    }
}

// Capability letters: k keyboard, p pointer, t touch, T tablet tool,
// P tablet pad, g gesture, S switch.
fn parse_capabilities(rest: &str) -> DeviceCapabilities {
    let letters = rest
        .split_whitespace()
        .find_map(|token| token.strip_prefix("cap:"))
        .unwrap_or("");
    DeviceCapabilities {
        gesture: letters.contains('g'),
        touch: letters.contains('t'),
    }
}

fn remainder_after<'a>(line: &'a str, kind: &str) -> &'a str {
    line.find(kind)
        .map(|at| &line[at + kind.len()..])
        .unwrap_or("")
}

/// Timestamp plus the numeric payload of an event line.
struct Body<'a> {
    kind: &'a str,
    time_ms: u64,
    numbers: Vec<f64>,
    cancelled: bool,
}

impl<'a> Body<'a> {
    fn parse(kind: &'a str, rest: &str) -> Result<Self, ParseError> {
        let mut tokens = rest.split_whitespace();
        let raw_time = tokens.next().ok_or_else(|| ParseError::MissingTimestamp {
            kind: kind.to_owned(),
        })?;
        let time_ms = parse_timestamp(kind, raw_time)?;

        let payload: String = tokens
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .map(|c| if matches!(c, '/' | '(' | ')' | '@') { ' ' } else { c })
            .collect();

        let mut numbers = Vec::new();
        let mut cancelled = false;
        for word in payload.split_whitespace() {
            match word {
                "cancelled" => cancelled = true,
                "unaccelerated" => {}
                _ => {
                    let raw = word.strip_suffix("mm").unwrap_or(word);
                    let value = raw.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                        kind: kind.to_owned(),
                        raw: word.to_owned(),
                    })?;
                    numbers.push(value);
                }
            }
        }

        Ok(Self {
            kind,
            time_ms,
            numbers,
            cancelled,
        })
    }

    fn require(&self, expected: usize) -> Result<(), ParseError> {
        if self.numbers.len() < expected {
            return Err(ParseError::MissingFields {
                kind: self.kind.to_owned(),
                expected,
                found: self.numbers.len(),
            });
        }
        Ok(())
    }

    fn first_integer(&self) -> Result<f64, ParseError> {
        self.require(1)?;
        let value = self.numbers[0];
        if value.fract() != 0.0 {
            return Err(ParseError::InvalidNumber {
                kind: self.kind.to_owned(),
                raw: value.to_string(),
            });
        }
        Ok(value)
    }

    fn fingers(&self) -> Result<u32, ParseError> {
        let value = self.first_integer()?;
        if value < 0.0 || value > f64::from(u32::MAX) {
            return Err(ParseError::InvalidNumber {
                kind: self.kind.to_owned(),
                raw: value.to_string(),
            });
        }
        Ok(value as u32)
    }

    fn slot(&self) -> Result<i32, ParseError> {
        let value = self.first_integer()?;
        if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
            return Err(ParseError::InvalidNumber {
                kind: self.kind.to_owned(),
                raw: value.to_string(),
            });
        }
        Ok(value as i32)
    }
}

fn parse_timestamp(kind: &str, raw: &str) -> Result<u64, ParseError> {
    let invalid = || ParseError::InvalidTimestamp {
        kind: kind.to_owned(),
        raw: raw.to_owned(),
    };
    let seconds = raw
        .trim_start_matches('+')
        .strip_suffix('s')
        .ok_or_else(invalid)?
        .parse::<f64>()
        .map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Ok((seconds * 1_000.0).round() as u64)
}
