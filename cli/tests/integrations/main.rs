mod eval;
mod run;
