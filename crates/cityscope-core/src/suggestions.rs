/// Canned questions surfaced before the first submission.
pub const QUICK_QUERIES: [&str; 6] = [
    "What is the road condition of Longfields Rd?",
    "Are there any parks near Baseline?",
    "What public transport is available near Carleton University?",
    "What are the nearby schools in Nepean?",
    "What are the crime rates in Ottawa?",
    "What are the popular restaurants in downtown Ottawa?",
];
