//! Interactive completion of blank fields

use crate::error::Result;
use crate::form::collector::FormState;
use crate::form::fields::{Rating, RatingField, TextField};
use std::io::{BufRead, Write};

/// Ask for every blank text field, then offer to change the ratings.
///
/// An empty answer leaves a text field blank so validation reports it, and
/// keeps the current rating.
pub fn fill_interactively<R: BufRead, W: Write>(
    form: &mut FormState,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    for field in TextField::ALL {
        if !form.text(field).trim().is_empty() {
            continue;
        }
        writeln!(output, "{}", field.prompt())?;
        if !field.is_short() {
            writeln!(output, "  ({})", field.placeholder())?;
        }
        write!(output, "> ")?;
        output.flush()?;

        let answer = read_line(input)?;
        form.set_text(field, answer);
    }

    for field in RatingField::ALL {
        loop {
            write!(
                output,
                "{} [{}-{}] (current {}): ",
                field.label(),
                Rating::MIN,
                Rating::MAX,
                form.rating(field).value()
            )?;
            output.flush()?;

            let answer = read_line(input)?;
            if answer.is_empty() {
                break;
            }
            match answer.parse::<u8>().ok().and_then(|v| Rating::new(v).ok()) {
                Some(rating) => {
                    form.set_rating(field, rating);
                    break;
                }
                None => writeln!(output, "Please enter a number between 1 and 5.")?,
            }
        }
    }

    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompts_only_blank_fields() {
        let mut form = FormState::new();
        form.set_text(TextField::FirstName, "Ana");

        let answers = "Lee\nRust\nEDA\nML\nChurn\nNLP\nETL\nSlides\nRigor\n7\n4\n\n";
        let mut input = Cursor::new(answers.as_bytes());
        let mut output = Vec::new();

        fill_interactively(&mut form, &mut input, &mut output).unwrap();

        assert_eq!(form.text(TextField::FirstName), "Ana");
        assert_eq!(form.text(TextField::LastName), "Lee");
        assert_eq!(form.text(TextField::Reflection), "Rigor");
        assert!(form.missing_fields().is_empty());
        assert_eq!(form.rating(RatingField::GitLevel).value(), 4);
        assert_eq!(form.rating(RatingField::PresentationLevel), Rating::DEFAULT);

        let shown = String::from_utf8(output).unwrap();
        assert!(!shown.contains("Enter your first name"));
        assert!(shown.contains("Please enter a number between 1 and 5."));
    }
}
