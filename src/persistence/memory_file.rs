//! Text format for a [`ReplayMemory`]: one experience per line, newest first.
//!
//! ```text
//! 0.5,1,0, 2 -1 0.25,1,0, False
//! ```
//!
//! Fields are separated by single spaces: state, action, reward, next state,
//! terminal flag. Vector values are each followed by a comma.

use ndarray::Array1;
use std::fs;
use std::path::Path;

use crate::error::{QGraphError, Result};
use crate::replay_memory::{Experience, ReplayMemory};

pub fn encode_memory(memory: &ReplayMemory) -> String {
    let mut out = String::new();
    for experience in memory.iter() {
        out.push_str(&encode_experience(experience));
        out.push('\n');
    }
    out
}

pub fn encode_experience(experience: &Experience) -> String {
    format!(
        "{} {} {} {} {}",
        encode_vector(experience.state()),
        experience.action(),
        experience.reward(),
        encode_vector(experience.next_state()),
        if experience.is_terminal() { "True" } else { "False" }
    )
}

fn encode_vector(values: &Array1<f64>) -> String {
    values.iter().map(|value| format!("{},", value)).collect()
}

/// Rebuild a memory of the given capacity; stored order is preserved.
pub fn decode_memory(text: &str, capacity: usize) -> Result<ReplayMemory> {
    decode_lines(text, capacity, None)
}

/// Like [`decode_memory`], but every experience must fit a network with
/// `input_size` inputs and `action_count` outputs.
pub fn decode_memory_expecting(
    text: &str,
    capacity: usize,
    input_size: usize,
    action_count: usize,
) -> Result<ReplayMemory> {
    decode_lines(text, capacity, Some((input_size, action_count)))
}

fn decode_lines(text: &str, capacity: usize, shape: Option<(usize, usize)>) -> Result<ReplayMemory> {
    let mut memory = ReplayMemory::with_capacity(capacity)?;
    let mut experiences = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let experience = decode_experience(line, index + 1)?;
        if let Some((input_size, action_count)) = shape {
            experience.check_shape(input_size, action_count)?;
        }
        experiences.push(experience);
    }

    for experience in experiences.into_iter().rev() {
        memory.enqueue(experience);
    }
    Ok(memory)
}

pub fn decode_experience(line: &str, line_number: usize) -> Result<Experience> {
    let fields: Vec<&str> = line.trim_end_matches(|c: char| c == '\r' || c == '\n').split(' ').collect();
    if fields.len() != 5 {
        return Err(QGraphError::parse(
            line_number,
            format!("expected 5 space separated fields, found {}", fields.len()),
        ));
    }

    let state = decode_vector(fields[0], line_number)?;
    let action = fields[1]
        .parse::<usize>()
        .map_err(|_| QGraphError::parse(line_number, format!("invalid action '{}'", fields[1])))?;
    let reward = fields[2]
        .parse::<f64>()
        .map_err(|_| QGraphError::parse(line_number, format!("invalid reward '{}'", fields[2])))?;
    let next_state = decode_vector(fields[3], line_number)?;
    let is_terminal = match fields[4].to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => {
            return Err(QGraphError::parse(
                line_number,
                format!("invalid terminal flag '{}'", other),
            ))
        }
    };

    Ok(Experience::new(state, action, reward, next_state, is_terminal))
}

fn decode_vector(field: &str, line_number: usize) -> Result<Array1<f64>> {
    let field = field.strip_suffix(',').unwrap_or(field);
    if field.is_empty() {
        return Ok(Array1::zeros(0));
    }
    field
        .split(',')
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| QGraphError::parse(line_number, format!("invalid vector value '{}'", token)))
        })
        .collect()
}

pub fn save_memory<P: AsRef<Path>>(memory: &ReplayMemory, path: P) -> Result<()> {
    fs::write(path.as_ref(), encode_memory(memory))?;
    log::info!("saved {} experiences to {}", memory.len(), path.as_ref().display());
    Ok(())
}

pub fn load_memory<P: AsRef<Path>>(path: P, capacity: usize) -> Result<ReplayMemory> {
    let text = fs::read_to_string(path.as_ref())?;
    decode_memory(&text, capacity)
}

pub fn load_memory_expecting<P: AsRef<Path>>(
    path: P,
    capacity: usize,
    input_size: usize,
    action_count: usize,
) -> Result<ReplayMemory> {
    let text = fs::read_to_string(path.as_ref())?;
    decode_memory_expecting(&text, capacity, input_size, action_count)
}
