pub fn named_entities_prompt(content: &str) -> String {
    format!(
        r#"Extract the named entities (people, organizations, places, products, titled works) from the text below.

Rules (non-negotiable):
1) Use ONLY the text provided. Do not invent entities.
2) Return a single comma-separated list of entity names, nothing else.
3) If the text contains no named entities, return an empty line.

Text:
{content}

Named entities:"#
    )
}

pub fn key_concepts_prompt(content: &str) -> String {
    format!(
        r#"Extract the key concepts from the text below, EXCLUDING named entities (people, organizations, places, products, titled works).

Rules (non-negotiable):
1) Use ONLY the text provided. Do not invent concepts.
2) Return a single comma-separated list of short concept labels, nothing else.
3) If the text contains no key concepts, return an empty line.

Text:
{content}

Key concepts:"#
    )
}
