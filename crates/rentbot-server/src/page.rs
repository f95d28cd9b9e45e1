//! Server-rendered HTML for the estimate form.

use rentbot_core::predictor::Choices;
use rentbot_core::record::{MAX_ROOMS, SELECT_PLACEHOLDER};

use serde::Deserialize;
use std::fmt::Write;

/// Raw url-encoded form fields. Number inputs arrive as empty strings when left blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormInput {
    pub district: Option<String>,
    pub house_type: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub amenity: Option<String>,
}

/// What to show under the form after a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Warning(String),
    Error(String),
    Estimate { rent: String, chart: Option<String> },
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select(out: &mut String, name: &str, label: &str, options: &[String], current: Option<&str>) {
    let _ = write!(out, "<label>{label}<select name=\"{name}\">");
    let _ = write!(out, "<option value=\"\">{SELECT_PLACEHOLDER}</option>");
    for opt in options {
        let sel = if current == Some(opt.as_str()) { " selected" } else { "" };
        let opt = escape(opt);
        let _ = write!(out, "<option value=\"{opt}\"{sel}>{opt}</option>");
    }
    out.push_str("</select></label>\n");
}

fn number(out: &mut String, name: &str, label: &str, current: Option<&str>) {
    let value = current.map(escape).unwrap_or_default();
    let _ = write!(
        out,
        "<label>{label}<input type=\"number\" name=\"{name}\" min=\"0\" max=\"{MAX_ROOMS}\" \
         step=\"1\" value=\"{value}\"></label>\n"
    );
}

pub fn render_page(
    choices: &Choices,
    fallback: bool,
    input: &FormInput,
    outcome: Option<&Outcome>,
) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>RentBot</title>\n<style>\
         body{font-family:sans-serif;max-width:720px;margin:2em auto}\
         label{display:block;margin:.5em 0}select,input{margin-left:.5em}\
         .warning{color:#8a6d3b}.error{color:#a94442}.result{font-size:1.3em}\
         </style>\n</head>\n<body>\n<h1>RentBot: Kigali rent estimate</h1>\n",
    );

    if fallback {
        out.push_str(
            "<p class=\"notice\">Model files not found. Estimates use a baseline rule.</p>\n",
        );
    }

    out.push_str("<form method=\"post\" action=\"/form\">\n");
    select(&mut out, "district", "District", &choices.districts, input.district.as_deref());
    select(&mut out, "house_type", "House type", &choices.house_types, input.house_type.as_deref());
    number(&mut out, "bedrooms", "Bedrooms", input.bedrooms.as_deref());
    number(&mut out, "bathrooms", "Bathrooms", input.bathrooms.as_deref());
    select(&mut out, "amenity", "Main amenity", &choices.amenities, input.amenity.as_deref());
    out.push_str("<button type=\"submit\">Predict Rent</button>\n</form>\n");

    match outcome {
        Some(Outcome::Warning(msg)) => {
            let _ = writeln!(out, "<p class=\"warning\">{}</p>", escape(msg));
        },
        Some(Outcome::Error(msg)) => {
            let _ = writeln!(out, "<p class=\"error\">{}</p>", escape(msg));
        },
        Some(Outcome::Estimate { rent, chart }) => {
            let _ = writeln!(out, "<p class=\"result\">Predicted Rent: {}</p>", escape(rent));
            if let Some(svg) = chart {
                out.push_str("<h2>Average rent by district</h2>\n<div class=\"chart\">");
                out.push_str(svg);
                out.push_str("</div>\n");
            }
        },
        None => {},
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Choices {
        Choices {
            districts: vec!["Gasabo".into(), "Kicukiro".into()],
            house_types: vec!["Villa".into()],
            amenities: vec!["Garden".into()],
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_empty_form() {
        let html = render_page(&choices(), false, &FormInput::default(), None);
        assert!(html.contains("<option value=\"\">--Select--</option>"));
        assert!(html.contains("<option value=\"Kicukiro\">Kicukiro</option>"));
        assert!(html.contains("max=\"10\""));
        assert!(!html.contains("baseline rule"));
        assert!(!html.contains("Predicted Rent:"));
    }

    #[test]
    fn test_keeps_selection_and_shows_result() {
        let input = FormInput {
            district: Some("Kicukiro".into()),
            bedrooms: Some("3".into()),
            ..Default::default()
        };
        let outcome = Outcome::Estimate { rent: "750,000 RWF".into(), chart: None };
        let html = render_page(&choices(), true, &input, Some(&outcome));
        assert!(html.contains("<option value=\"Kicukiro\" selected>"));
        assert!(html.contains("value=\"3\""));
        assert!(html.contains("Predicted Rent: 750,000 RWF"));
        assert!(html.contains("baseline rule"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let mut c = choices();
        c.districts.push("<script>".into());
        let html = render_page(&c, false, &FormInput::default(), None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
