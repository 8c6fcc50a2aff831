pub mod lesswrong;
