use crate::models::QueryContext;

use super::context_format::ContextBlock;

/// System directive (spec §4.6 step 2): answer from context only, cite
/// clauses/sections, address each sub-question separately, never truncate
/// mid-sentence.
pub fn system_directive(query: &QueryContext) -> String {
    let mut directive = String::from(
        "Answer the user's question using only the provided context. \
         Cite the clause or section identifier supporting each statement. \
         Do not truncate your answer mid-sentence.",
    );
    if query.sub_questions.len() > 1 {
        directive.push_str(&format!(
            " The question bundles {} sub-questions; address each one separately, \
             in order, using a numbered marker (1., 2., ...) for each.",
            query.sub_questions.len()
        ));
    }
    directive
}

/// User block (spec §4.6 step 2): the formatted context followed by the
/// original, un-normalized question.
pub fn user_block(query: &QueryContext, blocks: &[ContextBlock]) -> String {
    let context = super::context_format::render(blocks);
    format!("Context:\n\n{context}\nQuestion: {}", query.raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Complexity, Intent};

    fn query(sub_questions: Vec<&str>) -> QueryContext {
        QueryContext {
            raw: "raw question".to_string(),
            normalized: "raw question".to_string(),
            intent: Intent::InformationSeeking,
            matched_categories: vec![],
            intent_confidence: 0.0,
            complexity: Complexity::Low,
            keywords: vec![],
            sub_questions: sub_questions.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn single_sub_question_omits_enumeration_instruction() {
        let directive = system_directive(&query(vec!["q1?"]));
        assert!(!directive.contains("sub-questions"));
    }

    #[test]
    fn multiple_sub_questions_instructs_enumeration() {
        let directive = system_directive(&query(vec!["q1?", "q2?", "q3?"]));
        assert!(directive.contains("3 sub-questions"));
    }

    #[test]
    fn user_block_contains_raw_question_not_normalized() {
        let block = user_block(&query(vec!["q1?"]), &[]);
        assert!(block.contains("raw question"));
    }
}
