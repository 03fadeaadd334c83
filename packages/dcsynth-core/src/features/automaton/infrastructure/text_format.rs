/*
 * Text Mini-Language
 *
 * Three line-oriented sections:
 *   states:       label,T|F            (@label marks the initial state)
 *   events:       label,TF..,TF..      (observable / controllable per controller)
 *   transitions:  from,event,to[:TAG,...]
 *
 * Event labels may be vectors containing commas (`<a,a,*>`), so a
 * transition line is split at its first and last comma, and tags start at
 * the first ':' after the last '>'.
 *
 * Documents combine the sections for the CLI:
 *   [controllers]
 *   2
 *   [states]
 *   ...
 *   [events]
 *   ...
 *   [transitions]
 *   ...
 * Blank lines and lines starting with '#' are ignored.
 */

use crate::errors::{Result, SynthesisError};
use crate::features::automaton::domain::{Automaton, TransitionData};
use crate::features::automaton::ports::AutomatonView;

/// Reader/writer for the text mini-language
pub struct TextFormat;

/// Annotation tags written by U-Structure views; accepted and skipped on input
const ANNOTATION_TAG_PREFIXES: &[&str] = &[
    "UNCONDITIONAL_VIOLATION",
    "CONDITIONAL_VIOLATION",
    "DISABLEMENT_DECISION",
    "POTENTIAL_COMMUNICATION",
    "NASH_COMMUNICATION",
    "COMMUNICATION",
];

type Lines<'a> = Vec<(usize, &'a str)>;

impl TextFormat {
    pub const BAD_TAG: &'static str = "BAD";

    pub fn state_input(automaton: &Automaton) -> String {
        let initial = automaton.initial_state_id();
        automaton
            .states()
            .map(|s| {
                format!(
                    "{}{},{}",
                    if Some(s.id) == initial { "@" } else { "" },
                    s.label,
                    flag(s.marked)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn event_input(automaton: &Automaton) -> String {
        automaton
            .events()
            .map(|e| format!("{},{},{}", e.label, flags(&e.observable), flags(&e.controllable)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn transition_input<V: AutomatonView + ?Sized>(view: &V) -> String {
        let automaton = view.automaton();
        automaton
            .transitions()
            .filter_map(|data| {
                let from = automaton.state(data.initial_state_id)?;
                let event = automaton.event(data.event_id)?;
                let to = automaton.state(data.target_state_id)?;
                let tags = view.transition_tags(&data);
                let mut line = format!("{},{},{}", from.label, event.label, to.label);
                if !tags.is_empty() {
                    line.push(':');
                    line.push_str(&tags.join(","));
                }
                Some(line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse the three sections into a new automaton
    pub fn parse(
        n_controllers: usize,
        states: &str,
        events: &str,
        transitions: &str,
    ) -> Result<Automaton> {
        Self::parse_sections(
            n_controllers,
            numbered(states, 1),
            numbered(events, 1),
            numbered(transitions, 1),
        )
    }

    /// Parse a `[controllers]`/`[states]`/`[events]`/`[transitions]` document
    pub fn parse_document(text: &str) -> Result<Automaton> {
        let mut controllers: Lines = Vec::new();
        let mut states: Lines = Vec::new();
        let mut events: Lines = Vec::new();
        let mut transitions: Lines = Vec::new();
        let mut current: Option<&mut Lines> = None;

        for (line_no, line) in numbered(text, 1) {
            match line {
                "[controllers]" => current = Some(&mut controllers),
                "[states]" => current = Some(&mut states),
                "[events]" => current = Some(&mut events),
                "[transitions]" => current = Some(&mut transitions),
                _ if line.starts_with('[') => {
                    return Err(SynthesisError::parse(
                        line_no,
                        format!("unknown section '{}'", line),
                    ))
                }
                _ => match current.as_deref_mut() {
                    Some(section) => section.push((line_no, line)),
                    None => {
                        return Err(SynthesisError::parse(
                            line_no,
                            "content before the first section header",
                        ))
                    }
                },
            }
        }

        let (line_no, raw) = match controllers.as_slice() {
            [single] => *single,
            _ => {
                return Err(SynthesisError::parse(
                    controllers.first().map_or(0, |(n, _)| *n),
                    "[controllers] must hold exactly one number",
                ))
            }
        };
        let n_controllers = raw.parse::<usize>().map_err(|_| {
            SynthesisError::parse(line_no, format!("invalid controller count '{}'", raw))
        })?;

        Self::parse_sections(n_controllers, states, events, transitions)
    }

    /// Write a document readable by `parse_document`
    pub fn to_document<V: AutomatonView + ?Sized>(view: &V) -> String {
        let mut out = format!("[controllers]\n{}\n", view.automaton().n_controllers());
        for (header, body) in [
            ("[states]", view.state_input()),
            ("[events]", view.event_input()),
            ("[transitions]", view.transition_input()),
        ] {
            out.push_str(header);
            out.push('\n');
            if !body.is_empty() {
                out.push_str(&body);
                out.push('\n');
            }
        }
        out
    }

    fn parse_sections(
        n_controllers: usize,
        states: Lines,
        events: Lines,
        transitions: Lines,
    ) -> Result<Automaton> {
        let mut automaton = Automaton::new(n_controllers);

        for (line_no, line) in states {
            let (label, marked) = line
                .rsplit_once(',')
                .ok_or_else(|| SynthesisError::parse(line_no, "expected label,T|F"))?;
            let marked = parse_flags(marked, 1, line_no)?[0];
            let (label, is_initial) = match label.strip_prefix('@') {
                Some(rest) => (rest, true),
                None => (label, false),
            };
            automaton
                .add_state(label, marked, is_initial)
                .map_err(|e| SynthesisError::parse(line_no, e.to_string()))?;
        }

        for (line_no, line) in events {
            let mut parts = line.rsplitn(3, ',');
            let (Some(controllable), Some(observable), Some(label)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(SynthesisError::parse(
                    line_no,
                    "expected label,<observable>,<controllable>",
                ));
            };
            let observable = parse_flags(observable, n_controllers, line_no)?;
            let controllable = parse_flags(controllable, n_controllers, line_no)?;
            automaton
                .add_event(label, &observable, &controllable)
                .map_err(|e| SynthesisError::parse(line_no, e.to_string()))?;
        }

        for (line_no, line) in transitions {
            parse_transition(&mut automaton, line_no, line)?;
        }

        Ok(automaton)
    }
}

fn parse_transition(automaton: &mut Automaton, line_no: usize, line: &str) -> Result<()> {
    let search_from = line.rfind('>').unwrap_or(0);
    let (body, tags) = match line[search_from..].find(':') {
        Some(offset) => {
            let split = search_from + offset;
            (&line[..split], Some(&line[split + 1..]))
        }
        None => (line, None),
    };

    let malformed = || SynthesisError::parse(line_no, "expected from,event,to[:TAG,...]");
    let (from, rest) = body.split_once(',').ok_or_else(malformed)?;
    let (event, to) = rest.rsplit_once(',').ok_or_else(malformed)?;

    let from_id = automaton
        .state_id(from)
        .ok_or_else(|| SynthesisError::parse(line_no, format!("unknown state '{}'", from)))?;
    let to_id = automaton
        .state_id(to)
        .ok_or_else(|| SynthesisError::parse(line_no, format!("unknown state '{}'", to)))?;
    let event_id = automaton
        .event_id(event)
        .ok_or_else(|| SynthesisError::parse(line_no, format!("unknown event '{}'", event)))?;

    automaton.add_transition(from_id, event_id, to_id)?;

    for tag in tags.into_iter().flat_map(|t| t.split(',')) {
        if tag == TextFormat::BAD_TAG {
            automaton.mark_bad(TransitionData::new(from_id, event_id, to_id))?;
        } else if !ANNOTATION_TAG_PREFIXES.iter().any(|p| tag.starts_with(p)) {
            return Err(SynthesisError::parse(
                line_no,
                format!("unknown transition tag '{}'", tag),
            ));
        }
    }
    Ok(())
}

/// Trimmed, non-empty, non-comment lines with their 1-based numbers
fn numbered(text: &str, first_line: usize) -> Lines<'_> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + first_line, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

fn parse_flags(raw: &str, expected: usize, line_no: usize) -> Result<Vec<bool>> {
    if raw.chars().count() != expected {
        return Err(SynthesisError::parse(
            line_no,
            format!("expected {} T/F flags, got '{}'", expected, raw),
        ));
    }
    raw.chars()
        .map(|c| match c {
            'T' => Ok(true),
            'F' => Ok(false),
            other => Err(SynthesisError::parse(
                line_no,
                format!("invalid flag '{}'", other),
            )),
        })
        .collect()
}

fn flag(value: bool) -> char {
    if value {
        'T'
    } else {
        'F'
    }
}

fn flags(values: &[bool]) -> String {
    values.iter().map(|v| flag(*v)).collect()
}
