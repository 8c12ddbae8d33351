// Extraction collaborator: uploaded résumé files → raw text.
// Anything that fails here is dropped before the screening pipeline runs.

pub mod extract;
