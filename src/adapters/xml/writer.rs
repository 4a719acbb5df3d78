//! [`Questionnaire`] -> canonical `<questions>` XML.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::XmlError;
use crate::domain::questionnaire::{NextRule, NextTarget, Questionnaire};

/// Writes the canonical form: questions and options sorted by numeric id,
/// specific next rules before the default, empty tooltip/description and
/// empty sections left out. Text and attribute values are escaped.
pub fn write_questionnaire(questionnaire: &Questionnaire) -> Result<String, XmlError> {
    let mut questionnaire = questionnaire.clone();
    questionnaire.canonicalize();

    let mut out = XmlOut::new();
    out.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    out.open("questions", &[])?;

    for question in &questionnaire.questions {
        out.open("question", &[("id", question.id.as_str())])?;
        out.text_element("text", &[], &question.text)?;
        if let Some(tooltip) = question.tooltip.as_deref().filter(|t| !t.trim().is_empty()) {
            out.text_element("tooltip", &[], tooltip)?;
        }

        if !question.options.is_empty() {
            out.open("options", &[])?;
            for option in &question.options {
                out.text_element("option", &[("id", option.id.as_str())], &option.label)?;
            }
            out.close("options")?;
        }

        let mut rules: Vec<&NextRule> = question.next.iter().collect();
        rules.sort_by(|a, b| match (&a.option, &b.option) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        if !rules.is_empty() {
            out.open("nextQuestions", &[])?;
            for rule in rules {
                let mut attributes = Vec::with_capacity(2);
                if let Some(option) = &rule.option {
                    attributes.push(("optionId", option.as_str()));
                }
                match &rule.target {
                    NextTarget::Question(id) => attributes.push(("questionId", id.as_str())),
                    NextTarget::EndNode(id) => attributes.push(("endNodeId", id.as_str())),
                }
                out.empty("next", &attributes)?;
            }
            out.close("nextQuestions")?;
        }
        out.close("question")?;
    }

    if !questionnaire.end_nodes.is_empty() {
        out.open("endNodes", &[])?;
        for end in &questionnaire.end_nodes {
            out.open("endNode", &[("id", end.id.as_str())])?;
            out.text_element("text", &[], &end.label)?;
            out.close("endNode")?;
        }
        out.close("endNodes")?;
    }

    if !questionnaire.documents.is_empty() {
        out.open("dependencies", &[])?;
        for document in &questionnaire.documents {
            out.open("document", &[("type", document.kind.as_str())])?;
            out.text_element("text", &[], &document.title)?;
            if let Some(description) = document
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
            {
                out.text_element("description", &[], description)?;
            }
            if !document.conditions.is_empty() {
                out.open("conditions", &[])?;
                for condition in &document.conditions {
                    out.empty(
                        "condition",
                        &[
                            ("questionId", condition.question_id.as_str()),
                            ("optionId", condition.option_id.as_str()),
                        ],
                    )?;
                }
                out.close("conditions")?;
            }
            out.close("document")?;
        }
        out.close("dependencies")?;
    }

    out.close("questions")?;
    out.finish()
}

/// Thin wrapper over an indenting quick-xml writer.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), XmlError> {
        self.writer
            .write_event(event)
            .map_err(|e| XmlError::Write(e.to_string()))
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), XmlError> {
        self.emit(Event::Start(start(name, attributes)))
    }

    fn close(&mut self, name: &str) -> Result<(), XmlError> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), XmlError> {
        self.emit(Event::Empty(start(name, attributes)))
    }

    /// `<name attrs>text</name>` on one line.
    fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), XmlError> {
        self.open(name, attributes)?;
        self.emit(Event::Text(BytesText::new(text.trim())))?;
        self.close(name)
    }

    fn finish(self) -> Result<String, XmlError> {
        let mut xml = String::from_utf8(self.writer.into_inner())
            .map_err(|e| XmlError::Write(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }
}

fn start<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    BytesStart::new(name).with_attributes(attributes.iter().copied())
}
