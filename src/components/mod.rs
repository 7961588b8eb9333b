pub mod flow_diagram;
