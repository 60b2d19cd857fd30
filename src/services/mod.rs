pub mod totoro;
