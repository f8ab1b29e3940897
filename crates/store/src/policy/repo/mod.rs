pub mod kvs;
pub mod seaorm;
