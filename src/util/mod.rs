mod printer;

pub use printer::PrinterBuilder;
