//! Built-in Handlebars templates for the local code generator.
//!
//! Variables: `name`, `component`, `class`, `width`, `height`.

pub const HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{name}}</title>
  <link rel="stylesheet" href="./{{component}}.module.css">
</head>
<body>
  <div class="{{class}}">
    <h1>{{name}}</h1>
    <!-- Componente: {{name}} -->
    <!-- Dimensões: {{width}}x{{height}} -->
  </div>
</body>
</html>
"#;

pub const REACT: &str = r#"import React from "react";
import styles from "./{{component}}.module.css";

interface {{component}}Props {
  className?: string;
  children?: React.ReactNode;
}

export const {{component}}: React.FC<{{component}}Props> = ({ className, children }) => {
  return (
    <div className={`${styles.container} ${className || ''}`}>
      <h2>{{name}}</h2>
      {children}
    </div>
  );
};

export default {{component}};
"#;

pub const TAILWIND: &str = r#"import React from "react";

interface {{component}}Props {
  className?: string;
  children?: React.ReactNode;
}

export const {{component}}: React.FC<{{component}}Props> = ({ className, children }) => {
  return (
    <div className={`w-full min-h-[{{height}}px] flex flex-col items-center justify-center p-6 bg-white rounded-lg shadow-md ${className || ''}`}>
      <h2 className="text-2xl font-bold mb-4">{{name}}</h2>
      {children}
    </div>
  );
};

export default {{component}};
"#;

pub const CSS: &str = r#".container {
  width: {{width}}px;
  height: {{height}}px;
  padding: 24px;
  background: #ffffff;
  border-radius: 8px;
  box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1);
  display: flex;
  flex-direction: column;
  align-items: center;
  justify-content: center;
}

.container h2 {
  font-size: 24px;
  font-weight: 600;
  color: #111827;
  margin-bottom: 16px;
}
"#;
