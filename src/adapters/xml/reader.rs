//! `<questions>` XML -> [`Questionnaire`].

use tracing::{debug, warn};

use super::element::{parse_document, Element};
use super::XmlError;
use crate::domain::foundation::{DocumentIndex, EndNodeId, OptionId, QuestionId};
use crate::domain::questionnaire::{
    Document, DocumentType, EndNode, NextRule, NextTarget, Question, Questionnaire,
};

/// Parses a questionnaire document.
///
/// The root must be `<questions>` with at least one `<question>`, and every
/// question needs an `id`; otherwise the whole load fails. Smaller defects
/// (an option without id, a `<next>` without target, an unknown document
/// type) are skipped or defaulted with a warning.
pub fn parse_questionnaire(xml: &str) -> Result<Questionnaire, XmlError> {
    let root = parse_document(xml)?;
    if root.name != "questions" {
        return Err(XmlError::MissingElement("questions".into()));
    }
    if root.child("question").is_none() {
        return Err(XmlError::MissingElement("questions/question".into()));
    }

    let questions = root
        .children_named("question")
        .map(read_question)
        .collect::<Result<Vec<_>, _>>()?;

    let end_nodes = root
        .nested("endNodes", "endNode")
        .filter_map(read_end_node)
        .collect();

    let documents = root
        .nested("dependencies", "document")
        .enumerate()
        .map(|(index, element)| read_document(index, element))
        .collect();

    let mut questionnaire = Questionnaire {
        questions,
        end_nodes,
        documents,
    };
    questionnaire.canonicalize();
    debug!(
        questions = questionnaire.questions.len(),
        end_nodes = questionnaire.end_nodes.len(),
        documents = questionnaire.documents.len(),
        "Parsed questionnaire XML"
    );
    Ok(questionnaire)
}

fn read_question(element: &Element) -> Result<Question, XmlError> {
    let id = element
        .attr("id")
        .and_then(|raw| QuestionId::new(raw).ok())
        .ok_or_else(|| XmlError::missing_attribute("question", "id"))?;

    let mut question = Question::new(id, element.child_text("text").unwrap_or_default());
    if let Some(tooltip) = element.child_text("tooltip") {
        question = question.with_tooltip(tooltip);
    }

    for option in element.nested("options", "option") {
        let Some(option_id) = option.attr("id").and_then(|raw| OptionId::new(raw).ok()) else {
            warn!(question_id = %question.id, "Skipping option without id");
            continue;
        };
        if question.option(&option_id).is_some() {
            warn!(question_id = %question.id, option_id = %option_id, "Skipping duplicate option");
            continue;
        }
        let label = option
            .child_text("text")
            .unwrap_or_else(|| option.trimmed_text())
            .to_string();
        question = question.with_option(option_id, label);
    }

    for next in element.nested("nextQuestions", "next") {
        match read_next(next) {
            Some(rule) => question.next.push(rule),
            None => warn!(question_id = %question.id, "Skipping <next> without a target"),
        }
    }

    Ok(question)
}

/// A `questionId` target wins over `endNodeId` when both are given.
fn read_next(element: &Element) -> Option<NextRule> {
    let target = match (element.attr("questionId"), element.attr("endNodeId")) {
        (Some(question), _) => NextTarget::Question(QuestionId::new(question).ok()?),
        (None, Some(end)) => NextTarget::EndNode(EndNodeId::new(end).ok()?),
        (None, None) => return None,
    };
    Some(match element.attr("optionId") {
        Some(option) => NextRule::specific(OptionId::new(option).ok()?, target),
        None => NextRule::default_for_question(target),
    })
}

fn read_end_node(element: &Element) -> Option<EndNode> {
    let Some(id) = element.attr("id").and_then(|raw| EndNodeId::new(raw).ok()) else {
        warn!("Skipping end node without id");
        return None;
    };
    let label = element
        .child_text("text")
        .unwrap_or_else(|| element.trimmed_text())
        .to_string();
    Some(EndNode { id, label })
}

fn read_document(index: usize, element: &Element) -> Document {
    let kind = match element.attr("type") {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(document = index, kind = raw, "Unknown document type, using mandatory");
            DocumentType::Mandatory
        }),
        None => DocumentType::default(),
    };

    let mut document = Document::new(
        DocumentIndex::new(index),
        element.child_text("text").unwrap_or_default(),
        kind,
    );
    if let Some(description) = element.child_text("description") {
        document = document.with_description(description);
    }

    for condition in element.nested("conditions", "condition") {
        let ids = (
            condition.attr("questionId").and_then(|raw| QuestionId::new(raw).ok()),
            condition.attr("optionId").and_then(|raw| OptionId::new(raw).ok()),
        );
        match ids {
            (Some(question_id), Some(option_id)) => {
                document = document.with_condition(question_id, option_id);
            }
            _ => warn!(document = index, "Skipping incomplete condition"),
        }
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<questions>
  <question id="2">
    <text>Second</text>
    <options><option id="1">Only</option></options>
  </question>
  <question id="1">
    <text>First</text>
    <tooltip>Think about it</tooltip>
    <options>
      <option id="2">Two</option>
      <option id="1">One</option>
    </options>
    <nextQuestions>
      <next optionId="2" endNodeId="done"/>
      <next questionId="2"/>
    </nextQuestions>
  </question>
  <endNodes>
    <endNode id="done"><text>All done</text></endNode>
  </endNodes>
  <dependencies>
    <document type="optional">
      <text>Form</text>
      <description>Bring it</description>
      <conditions>
        <condition questionId="1" optionId="1"/>
      </conditions>
    </document>
  </dependencies>
</questions>"#;

    fn q(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn o(id: &str) -> OptionId {
        OptionId::new(id).unwrap()
    }

    mod structure {
        use super::*;

        #[test]
        fn questions_and_options_are_sorted() {
            let questionnaire = parse_questionnaire(SAMPLE).unwrap();
            assert_eq!(questionnaire.questions[0].id, q("1"));
            assert_eq!(questionnaire.questions[0].options[0].label, "One");
            assert_eq!(questionnaire.questions[0].tooltip.as_deref(), Some("Think about it"));
        }

        #[test]
        fn next_rules_support_both_targets() {
            let questionnaire = parse_questionnaire(SAMPLE).unwrap();
            let first = &questionnaire.questions[0];
            assert_eq!(
                first.resolve_next(&o("2")),
                Some(&NextTarget::EndNode(EndNodeId::new("done").unwrap()))
            );
            assert_eq!(first.resolve_next(&o("1")), Some(&NextTarget::Question(q("2"))));
        }

        #[test]
        fn end_nodes_and_documents_are_read() {
            let questionnaire = parse_questionnaire(SAMPLE).unwrap();
            assert_eq!(questionnaire.end_nodes[0].label, "All done");
            let document = &questionnaire.documents[0];
            assert_eq!(document.title, "Form");
            assert_eq!(document.kind, DocumentType::Optional);
            assert_eq!(document.description.as_deref(), Some("Bring it"));
            assert_eq!(document.conditions.len(), 1);
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn wrong_root_is_rejected() {
            assert_eq!(
                parse_questionnaire("<survey><question id=\"1\"/></survey>"),
                Err(XmlError::MissingElement("questions".into()))
            );
        }

        #[test]
        fn root_without_questions_is_rejected() {
            assert_eq!(
                parse_questionnaire("<questions><endNodes/></questions>"),
                Err(XmlError::MissingElement("questions/question".into()))
            );
        }

        #[test]
        fn question_without_id_is_rejected() {
            assert!(matches!(
                parse_questionnaire("<questions><question><text>x</text></question></questions>"),
                Err(XmlError::MissingAttribute { .. })
            ));
        }
    }

    mod lenience {
        use super::*;

        #[test]
        fn defects_below_question_level_are_skipped() {
            let xml = r#"<questions><question id="1"><text>Q</text>
                <options><option>nameless</option><option id="a">A</option></options>
                <nextQuestions><next optionId="a"/></nextQuestions>
              </question>
              <dependencies><document type="weird"><text>D</text>
                <conditions><condition questionId="1"/></conditions>
              </document></dependencies></questions>"#;
            let questionnaire = parse_questionnaire(xml).unwrap();
            assert_eq!(questionnaire.questions[0].options.len(), 1);
            assert!(questionnaire.questions[0].next.is_empty());
            assert_eq!(questionnaire.documents[0].kind, DocumentType::Mandatory);
            assert!(questionnaire.documents[0].conditions.is_empty());
        }

        #[test]
        fn missing_text_and_blank_tooltip_are_tolerated() {
            let xml = r#"<questions><question id="1"><tooltip>  </tooltip>
                <options><option id="a"><text>Via text</text></option></options>
              </question></questions>"#;
            let questionnaire = parse_questionnaire(xml).unwrap();
            assert_eq!(questionnaire.questions[0].text, "");
            assert!(questionnaire.questions[0].tooltip.is_none());
            assert_eq!(questionnaire.questions[0].options[0].label, "Via text");
        }
    }
}
