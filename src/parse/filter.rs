//! Turns the raw lines of a menus post into lines the [`Index`] driver can
//! tag one at a time: day headers, `comida`/`cena` markers, `1er plato:` /
//! `2º plato:` lines, combined plates and `cóctel`.
//!
//! [`Index`]: crate::menu::Index
use crate::parse::patterns::{
    is_ignored, DAY, FIRST_PLATE, SECOND_PLATE, SEMI_DAY_1, SEMI_DAY_2,
};

/// Input accepted by [`filter_data`]: a whole text, or its lines. The output
/// has the same shape as the input.
pub trait FilterInput {
    type Output;

    fn into_lines(self) -> Vec<String>;
    fn from_lines(lines: Vec<String>) -> Self::Output;
}

impl FilterInput for &str {
    type Output = String;

    fn into_lines(self) -> Vec<String> {
        self.lines().map(str::to_owned).collect()
    }

    fn from_lines(lines: Vec<String>) -> Self::Output {
        lines.join("\n")
    }
}

impl<S: AsRef<str>> FilterInput for &[S] {
    type Output = Vec<String>;

    fn into_lines(self) -> Vec<String> {
        self.iter().map(|line| line.as_ref().to_owned()).collect()
    }

    fn from_lines(lines: Vec<String>) -> Self::Output {
        lines
    }
}

impl<S: AsRef<str>> FilterInput for Vec<S> {
    type Output = Vec<String>;

    fn into_lines(self) -> Vec<String> {
        self.iter().map(|line| line.as_ref().to_owned()).collect()
    }

    fn from_lines(lines: Vec<String>) -> Self::Output {
        lines
    }
}

pub fn filter_data<T: FilterInput>(data: T) -> T::Output {
    T::from_lines(filter_lines(data.into_lines()))
}

fn normalize_line(line: &str) -> String {
    let line = line.to_lowercase().replace('.', "");
    let line = line.trim();
    if FIRST_PLATE.is_match(line) {
        FIRST_PLATE.replace(line, "1er plato:").into_owned()
    } else if SECOND_PLATE.is_match(line) {
        SECOND_PLATE.replace(line, "2º plato:").into_owned()
    } else {
        line.to_owned()
    }
}

// continuation lines without anything to continue are dropped
fn append(out: &mut [String], text: &str) {
    if let Some(last) = out.last_mut() {
        last.push(' ');
        last.push_str(text);
    }
}

fn filter_lines(raw: Vec<String>) -> Vec<String> {
    let data: Vec<String> = raw
        .iter()
        .map(|line| normalize_line(line))
        .filter(|line| !line.is_empty())
        .collect();

    let mut out: Vec<String> = Vec::with_capacity(data.len());
    for (i, line) in data.iter().enumerate() {
        let prev = i.checked_sub(1).map_or("", |j| data[j].as_str());
        let next = data.get(i + 1).map_or("", String::as_str);
        let dessert = line.contains("postre");
        // last emitted line, not the raw previous one
        let after_combined = out.last().is_some_and(|last| last.contains("combinado"));

        if line.chars().count() <= 2 {
            continue;
        }

        if line.contains("combinado") {
            out.push(line.replace("1er plato:", "").trim().to_owned());
        } else if line.contains("2º plato:") && after_combined {
            let rest = line.replace("2º plato:", "");
            let rest = rest.trim();
            if !rest.is_empty() {
                append(&mut out, rest);
            }
        } else if line.contains("1er plato:") || line.contains("2º plato:") {
            out.push(line.clone());
        } else if line.contains("comida") || line.contains("cena") {
            out.push(line.clone());
        } else if line.contains("cóctel") || line.contains("coctel") {
            out.push("cóctel".to_owned());
        } else if let Some(day) = DAY.find(line) {
            out.push(day.as_str().to_owned());
        } else if let Some(year) = SEMI_DAY_2.find(line) {
            if let Some(day) = SEMI_DAY_1.find(prev) {
                out.push(format!("{} de {}", day.as_str(), year.as_str()));
            }
        } else if prev.contains("2º plato") && prev.ends_with("con") && !dessert {
            append(&mut out, line);
        } else if prev.contains("1er plato") && next.contains("2º plato") && !dessert {
            append(&mut out, line);
        } else if prev.contains("combinado") && after_combined && !dessert {
            append(&mut out, line);
        } else if (prev.contains("comida") || prev.contains("cena")) && !is_ignored(line) {
            out.push(format!("1er plato: {line}"));
        }
    }
    out
}
