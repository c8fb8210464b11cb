//! Person records
//!
//! Vanta returns per-source provenance and a full task breakdown with every
//! person. Both are large and rarely useful to an agent, so list responses
//! are trimmed before they are handed back.

use serde_json::Value;

/// Drop `sources` and `tasksSummary.details` from one person, keeping the
/// rest of `tasksSummary`.
pub fn filter_person(person: &mut Value) {
    let Some(fields) = person.as_object_mut() else {
        return;
    };

    fields.remove("sources");
    if let Some(Value::Object(summary)) = fields.get_mut("tasksSummary") {
        summary.remove("details");
    }
}

/// Apply [`filter_person`] to every element of `results.data` when it is an
/// array. Anything else passes through unchanged.
pub fn filter_people_response(body: &mut Value) {
    if let Some(Value::Array(people)) = body.pointer_mut("/results/data") {
        people.iter_mut().for_each(filter_person);
    }
}
