// Resume endpoints: free-text analysis and role prediction.
// LLM calls go through the gateway in AppState; classification through RoleClassifier.

pub mod handlers;
pub mod prediction;
