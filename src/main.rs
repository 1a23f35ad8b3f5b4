//! # Quire CLI
//!
//! Usage:
//!   quire document.json -o artifact.json
//!   echo '{ ... }' | quire -o artifact.json
//!   quire --example > resume.json
//!
//! The input is one JSON object with a `template` and a `data` field. Pages
//! are summarized on stderr; `-o` writes the printable artifact as JSON.

use std::env;
use std::fs;
use std::io::{self, Read};

use serde::Deserialize;
use serde_json::Value;

use quire::estimate::EstimatedLayout;
use quire::model::Template;
use quire::print::export;

#[derive(Deserialize)]
struct DocumentInput {
    template: Template,
    #[serde(default)]
    data: Value,
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_resume_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    // Parse output path
    let output_path = args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone());

    let document: DocumentInput = match serde_json::from_str(&input) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("✗ Failed to parse document: {}", e);
            std::process::exit(1);
        }
    };

    let provider = EstimatedLayout::new(document.template.page.content_width());
    match quire::paginate(&document.template, &document.data, &provider) {
        Ok(pages) => {
            let usable = document.template.page.usable_height();
            eprintln!("✓ {} page(s), usable height {:.0}px", pages.len(), usable);
            for (i, page) in pages.iter().enumerate() {
                eprintln!("  page {}: {} unit(s), {:.0}px", i + 1, page.units.len(), page.height);
            }
            if let Some(path) = output_path {
                let artifact = export(&pages, &document.template.page);
                let json = serde_json::to_string_pretty(&artifact)
                    .expect("Failed to serialize artifact");
                fs::write(&path, json).expect("Failed to write artifact");
                eprintln!("✓ Written artifact to {}", path);
            }
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_resume_json() -> &'static str {
    r##"{
  "template": {
    "page": {
      "size": "A4",
      "padding": { "top": 48, "right": 48, "bottom": 48, "left": 48 }
    },
    "constants": {
      "sectionGap": 18
    },
    "children": [
      {
        "type": "page-block",
        "id": "header",
        "children": [
          {
            "type": "row",
            "props": { "gap": 24, "noPageBlock": true },
            "children": [
              { "type": "image", "props": { "src": { "bind": "contact.photo", "default": "" }, "width": 96, "height": 96 } },
              {
                "type": "stack",
                "props": { "noPageBlock": true },
                "children": [
                  { "type": "heading", "props": { "level": 1, "content": "{{contact.name}}" } },
                  { "type": "text", "props": { "content": "{{contact.headline}}" } },
                  { "type": "text", "props": { "content": "{{contact.email}} · {{contact.phone}}" } }
                ]
              }
            ]
          },
          { "type": "divider" }
        ]
      },
      { "type": "heading", "id": "work-title", "props": { "level": 2, "content": "Work Experience" } },
      {
        "type": "stack",
        "id": "work",
        "repeat": "work",
        "children": [
          {
            "type": "page-block",
            "children": [
              { "type": "heading", "props": { "level": 3, "content": "{{role}} · {{company}}" } },
              { "type": "text", "props": { "content": "{{start}} – {{end}}" } },
              { "type": "text", "props": { "content": { "bind": "summary", "default": "" } } }
            ]
          }
        ]
      },
      { "type": "heading", "id": "education-title", "props": { "level": 2, "content": "Education" } },
      {
        "type": "stack",
        "id": "education",
        "repeat": "education",
        "children": [
          {
            "type": "page-block",
            "children": [
              { "type": "heading", "props": { "level": 3, "content": "{{school}}" } },
              { "type": "text", "props": { "content": "{{degree}}, {{year}}" } }
            ]
          }
        ]
      },
      { "type": "heading", "id": "skills-title", "props": { "level": 2, "content": "Skills" } },
      { "type": "text", "id": "skills", "props": { "content": "{{skills}}" } }
    ]
  },
  "data": {
    "contact": {
      "name": "Ada Lovelace",
      "headline": "Systems Engineer",
      "email": "ada@example.com",
      "phone": "+44 20 7946 0000"
    },
    "work": [
      {
        "role": "Principal Engineer",
        "company": "Analytical Engines Ltd",
        "start": "2019",
        "end": "present",
        "summary": "Led the layout and pagination core of a document platform, from measurement scheduling to print output."
      },
      {
        "role": "Senior Engineer",
        "company": "Difference Works",
        "start": "2014",
        "end": "2019",
        "summary": "Built data-binding tooling for template-driven reports."
      }
    ],
    "education": [
      { "school": "University of London", "degree": "MSc Mathematics", "year": "2013" }
    ],
    "skills": ["Rust", "Layout engines", "Typography", "Distributed systems"]
  }
}"##
}
