//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use crate::model::*;

/// Five texts, three + three blanks, five questions, four situations.
pub fn sample_content() -> ExamContent {
    let teil1 = Teil1Content {
        instruction: "Lesen Sie die Überschriften und die Texte.".into(),
        texts: (1..=5)
            .map(|id| ReadingText {
                id,
                text: format!("Text {id}"),
            })
            .collect(),
        headlines: ["a", "b", "c", "d", "e", "f", "g", "h"]
            .iter()
            .map(|id| Headline {
                id: id.to_string(),
                text: format!("Überschrift {id}"),
            })
            .collect(),
        answers: [(1, "c"), (2, "a"), (3, "h"), (4, "e"), (5, "b")]
            .iter()
            .map(|(text_id, headline_id)| HeadlineAnswer {
                text_id: *text_id,
                headline_id: headline_id.to_string(),
            })
            .collect(),
    };

    let sb1 = cloze(
        &[21, 22, 23],
        &[
            (21, vec!["leider", "gern", "sofort"], "leider"),
            (22, vec!["weil", "denn", "obwohl"], "weil"),
            (23, vec!["mit", "bei", "von"], "mit"),
        ],
    );
    let sb2 = cloze(
        &[31, 32, 33],
        &[
            (31, vec![], "Verspätung"),
            (32, vec![], "Termin"),
            (33, vec![], "Grüßen"),
        ],
    );

    let teil2 = Teil2Content {
        instruction: "Lesen Sie den Text.".into(),
        passage: Passage {
            title: "Ein neuer Anfang".into(),
            text: "...".into(),
        },
        questions: [(6, "b"), (7, "a"), (8, "c"), (9, "a"), (10, "b")]
            .iter()
            .map(|(id, answer)| McQuestion {
                id: *id,
                prompt: format!("Frage {id}"),
                options: ["a", "b", "c"]
                    .iter()
                    .map(|o| McOption {
                        id: o.to_string(),
                        text: format!("Antwort {o}"),
                    })
                    .collect(),
                answer_id: answer.to_string(),
            })
            .collect(),
    };

    let teil3 = Teil3Content {
        instruction: String::new(),
        situations: (11..=14)
            .map(|id| Situation {
                id,
                text: format!("Situation {id}"),
            })
            .collect(),
        ads: ["a", "b", "c", "d", "e"]
            .iter()
            .map(|id| Ad {
                id: id.to_string(),
                text: format!("Anzeige {id}"),
            })
            .collect(),
        answers: [(11, "b"), (12, "e"), (13, "a"), (14, "d")]
            .iter()
            .map(|(situation_id, ad_id)| AdAnswer {
                situation_id: *situation_id,
                ad_id: ad_id.to_string(),
            })
            .collect(),
    };

    ExamContent {
        teil1,
        sprachbausteine1: sb1,
        sprachbausteine2: sb2,
        teil2,
        teil3,
    }
}

fn cloze(ids: &[ItemId], blanks: &[(ItemId, Vec<&str>, &str)]) -> ClozeContent {
    let mut segments = vec![Segment::Text("Liebe Frau Berger, ".into())];
    for id in ids {
        segments.push(Segment::Blank(*id));
        segments.push(Segment::Text(" ... ".into()));
    }
    ClozeContent {
        title: "Brief".into(),
        instruction: "Ergänzen Sie die Lücken.".into(),
        segments,
        blanks: blanks
            .iter()
            .map(|(id, options, _)| Blank {
                id: *id,
                options: options.iter().map(|o| o.to_string()).collect(),
            })
            .collect(),
        answers: blanks
            .iter()
            .map(|(id, _, answer)| BlankAnswer {
                id: *id,
                answer: answer.to_string(),
            })
            .collect(),
    }
}

/// A theme with only fallback content.
pub fn single_theme() -> ExamTheme {
    ExamTheme {
        id: "alicia".into(),
        title: "Alicia".into(),
        default_version: None,
        version_order: vec![],
        versions: BTreeMap::new(),
        content: Some(sample_content()),
    }
}

/// A theme with two selectable versions; "2" differs from "1" in Teil 2's key.
pub fn versioned_theme() -> ExamTheme {
    let first = sample_content();
    let mut second = sample_content();
    second.teil2.questions[0].answer_id = "c".into();

    let mut versions = BTreeMap::new();
    versions.insert(
        "1".to_string(),
        ExamVersion {
            key: "1".into(),
            label: "V1".into(),
            title: "Version 1".into(),
            content: first,
        },
    );
    versions.insert(
        "2".to_string(),
        ExamVersion {
            key: "2".into(),
            label: "V2".into(),
            title: "Version 2".into(),
            content: second,
        },
    );

    ExamTheme {
        id: "annika-1".into(),
        title: "Annika 1".into(),
        default_version: Some("1".into()),
        version_order: vec!["default".into(), "1".into(), "2".into()],
        versions,
        content: None,
    }
}
